//! Comments for named type declarations

use super::{jsify, TypeMapper};
use crate::design::{DataType, DEFAULT_VIEW};
use crate::error::{Error, Result};
use crate::util::comment;

impl TypeMapper<'_> {
    /// Comment text for the declaration of a named type.
    ///
    /// An authored description wins; otherwise one is made up from the
    /// type's name. Anything else than a user or media type has no
    /// description.
    pub fn describe(&self, t: &DataType, upper: bool) -> Result<String> {
        match t {
            DataType::User(name) => {
                let ut = self
                    .design
                    .user_type(name)
                    .ok_or_else(|| unknown(name))?;
                if let Some(desc) = authored(ut.attribute.description.as_deref()) {
                    return Ok(comment(desc));
                }
                let type_name = jsify(name, upper)?;
                match ut.links_of.as_deref() {
                    Some(media) => Ok(format!(
                        "{} contains links to related resources of {}.",
                        type_name,
                        jsify(media, upper)?
                    )),
                    None => Ok(format!("{} user type.", type_name)),
                }
            }
            DataType::Media(r) => {
                let mt = self
                    .design
                    .media_type(&r.name)
                    .ok_or_else(|| unknown(&r.name))?;
                if let Some(desc) = authored(mt.attribute.description.as_deref()) {
                    return Ok(format!("{} ({} view)", comment(desc), r.view()));
                }
                let type_name = self.media_name(mt, r, upper)?;
                let DataType::Array(elem) = &mt.attribute.data_type else {
                    return Ok(format!("{} media type.", type_name));
                };
                let elem_type = match &elem.data_type {
                    DataType::Media(e) if r.view() != DEFAULT_VIEW => {
                        DataType::media(e.name.clone(), Some(r.view()))
                    }
                    other => other.clone(),
                };
                Ok(format!(
                    "{} media type is a collection of {}.",
                    type_name,
                    self.type_name(&elem_type, &elem.required, 0, !upper)?
                ))
            }
            _ => Ok(String::new()),
        }
    }
}

fn authored(desc: Option<&str>) -> Option<&str> {
    desc.filter(|d| !d.trim().is_empty())
}

fn unknown(name: &str) -> Error {
    Error::UnknownTypeKind {
        name: name.to_string(),
        context: "description".into(),
    }
}
