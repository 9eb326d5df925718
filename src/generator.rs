//! Client module generation
//!
//! [`Generator::generate`] renders the whole `client.js` module in memory
//! and only then writes it below `<out_dir>/js`. Files created by a run that
//! fails are removed again.

use crate::config::{check_version, GeneratorConfig};
use crate::design::{Action, DataType, Design, Kind, Resource, ERROR_MEDIA_NAME};
use crate::error::{Error, Result};
use crate::jsgen::{TransformGenerator, TypeMapper};
use crate::templates::{self, ActionView, ClientContext, DeclarationView, Provenance};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name of the generated module
pub const CLIENT_FILE: &str = "client.js";

/// Connection defaults baked into the generated client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub scheme: String,
    pub host: String,
    pub timeout: Duration,
}

impl ClientSettings {
    /// Settings from the configuration, falling back to the design
    pub fn resolve(design: &Design, config: &GeneratorConfig) -> Result<Self> {
        if let Some(version) = config.version.as_deref().or(design.version.as_deref()) {
            check_version(version)?;
        }
        let scheme = config
            .scheme
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| design.schemes.first().cloned())
            .unwrap_or_else(|| "http".to_string());
        let host = config
            .host
            .clone()
            .or_else(|| design.host.clone())
            .filter(|h| !h.is_empty())
            .ok_or(Error::MissingHost)?;
        Ok(Self {
            scheme,
            host,
            timeout: config.timeout(),
        })
    }
}

/// Writes the client module of a design
pub struct Generator<'a> {
    design: &'a Design,
    config: GeneratorConfig,
    /// Design file name shown in the provenance header
    source: Option<String>,
    genfiles: Vec<PathBuf>,
}

impl<'a> Generator<'a> {
    pub fn new(design: &'a Design, config: GeneratorConfig) -> Self {
        Self {
            design,
            config,
            source: None,
            genfiles: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Generate `js/client.js` and return the created paths
    pub fn generate(&mut self) -> Result<Vec<PathBuf>> {
        match self.write_files() {
            Ok(()) => {
                info!(files = self.genfiles.len(), "generation complete");
                Ok(self.genfiles.clone())
            }
            Err(e) => {
                self.cleanup();
                Err(e)
            }
        }
    }

    fn write_files(&mut self) -> Result<()> {
        let code = render_client(self.design, &self.config, self.source.as_deref())?;

        let js_dir = self.config.out_dir.join("js");
        if js_dir.exists() {
            fs::remove_dir_all(&js_dir)?;
        }
        fs::create_dir_all(&js_dir)?;
        self.genfiles.push(js_dir.clone());

        let file = js_dir.join(CLIENT_FILE);
        self.genfiles.push(file.clone());
        fs::write(&file, code)?;
        info!(path = %file.display(), "wrote client module");
        Ok(())
    }

    /// Remove the files created by the last run
    pub fn cleanup(&mut self) {
        for path in self.genfiles.drain(..).rev() {
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "failed to remove generated file");
                }
            }
        }
    }
}

/// Render the complete client module of a design
pub fn render_client(
    design: &Design,
    config: &GeneratorConfig,
    source: Option<&str>,
) -> Result<String> {
    let settings = ClientSettings::resolve(design, config)?;
    let mapper = TypeMapper::new(design, &config.render);

    let ctx = ClientContext {
        provenance: config
            .render
            .provenance
            .then(|| Provenance::new(source.unwrap_or(&design.name), design)),
        description: design.description.clone(),
        scheme: settings.scheme,
        host: settings.host,
        timeout_ms: settings.timeout.as_millis(),
        actions: actions(&mapper)?,
        declarations: declarations(&mapper)?,
        transforms: transforms(design, config)?,
    };
    templates::render_client(&ctx)
}

/// Request methods, sorted by action name
fn actions(mapper: &TypeMapper<'_>) -> Result<Vec<ActionView>> {
    let mut by_name: BTreeMap<&str, Vec<(&Resource, &Action)>> = BTreeMap::new();
    for res in &mapper.design().resources {
        for action in &res.actions {
            by_name.entry(action.name.as_str()).or_default().push((res, action));
        }
    }

    let mut views = Vec::new();
    for (res, action) in by_name.into_values().flatten() {
        match ActionView::from_action(mapper, res, action)? {
            Some(view) => views.push(view),
            None => warn!(
                resource = %res.name,
                action = %action.name,
                "action has no route, skipping"
            ),
        }
    }
    Ok(views)
}

/// Type declarations: the error media type, the other media types by name
/// (every view, then their links), then user types by name
fn declarations(mapper: &TypeMapper<'_>) -> Result<Vec<DeclarationView>> {
    let design = mapper.design();
    let mut out = Vec::new();

    let error = design
        .media_type(ERROR_MEDIA_NAME)
        .ok_or_else(|| Error::Other("design is not linked".into()))?;
    for view in error.view_names() {
        out.push(DeclarationView::media(mapper, error, view)?);
    }

    for mt in design.media_types.values().filter(|mt| !mt.is_error()) {
        if !is_declared(design, &mt.attribute.data_type)? {
            debug!(media = %mt.type_name, "media type is neither an object nor an array");
            continue;
        }
        for view in mt.view_names() {
            out.push(DeclarationView::media(mapper, mt, view)?);
        }
        let links = design
            .types
            .values()
            .filter(|ut| ut.links_of.as_deref() == Some(mt.type_name.as_str()));
        for ut in links {
            out.push(DeclarationView::user(mapper, ut)?);
        }
    }

    for ut in design.types.values().filter(|ut| ut.links_of.is_none()) {
        if !is_declared(design, &ut.attribute.data_type)? {
            debug!(user_type = %ut.type_name, "user type is neither an object nor an array");
            continue;
        }
        out.push(DeclarationView::user(mapper, ut)?);
    }
    Ok(out)
}

fn is_declared(design: &Design, t: &DataType) -> Result<bool> {
    Ok(matches!(design.kind(t)?, Kind::Object | Kind::Array))
}

/// Requested transform functions. One generator serves the whole module so
/// helpers and temporary variables are never declared twice.
fn transforms(design: &Design, config: &GeneratorConfig) -> Result<Vec<String>> {
    let mut generator = TransformGenerator::new(design, &config.render);
    let mut out = Vec::new();
    for req in &design.transforms {
        let source = design.named_type(&req.source)?;
        let target = design.named_type(&req.target)?;
        let code = generator.transform(&source, &target, req.name.as_deref())?;
        if code.is_empty() {
            debug!(source = %req.source, target = %req.target, "transform already generated");
            continue;
        }
        out.push(code);
    }
    Ok(out)
}

/// Path of the module generated below `out_dir`
pub fn client_path(out_dir: &Path) -> PathBuf {
    out_dir.join("js").join(CLIENT_FILE)
}
