//! Media type projection onto views

use super::types::{Attribute, DataType, MediaRef, DEFAULT_VIEW};
use super::{Design, MediaType};
use crate::error::{Error, Result};

/// Name of the attribute views list to include the links of a media type
const LINKS_ATTRIBUTE: &str = "links";

/// A media type seen through one of its views
#[derive(Debug, Clone)]
pub struct Projection {
    /// Reference to the projected type (media name plus view)
    pub reference: DataType,
    /// Identifier with the view parameter appended
    pub identifier: String,
    /// Projected structure
    pub attribute: Attribute,
}

impl Design {
    /// Project a media type onto one of its views
    pub fn project(&self, mt: &MediaType, view: &str) -> Result<Projection> {
        let invalid = |reason: String| Error::InvalidView {
            media: mt.type_name.clone(),
            view: view.to_string(),
            reason,
        };
        let declared = mt.views.get(view);
        if declared.is_none() && view != DEFAULT_VIEW {
            return Err(invalid("view is not defined".into()));
        }

        let mut attribute = mt.attribute.clone();
        match &mut attribute.data_type {
            DataType::Object(fields) => {
                if let Some(v) = declared {
                    let mut projected = super::Object::new();
                    for name in &v.attributes {
                        if name == LINKS_ATTRIBUTE && !mt.links.is_empty() {
                            projected.insert(
                                name.clone(),
                                Attribute::new(DataType::user(mt.links_type_name()))
                                    .with_description("Links to related resources"),
                            );
                            continue;
                        }
                        let Some(field) = fields.get(name) else {
                            return Err(invalid(format!("unknown attribute {}", name)));
                        };
                        projected.insert(name.clone(), field.clone());
                    }
                    for (name, nested) in &v.nested {
                        let Some(field) = projected.get_mut(name) else {
                            return Err(invalid(format!(
                                "nested view for attribute {} which is not in the view",
                                name
                            )));
                        };
                        self.view_field(field, nested).map_err(invalid)?;
                    }
                    *fields = projected;
                }
                attribute.required.retain(|r| fields.contains_key(r));
            }
            DataType::Array(elem) => {
                if view != DEFAULT_VIEW {
                    if let DataType::Media(r) = &elem.data_type {
                        let elem_media = self.media_type(&r.name).ok_or_else(|| {
                            invalid(format!("unknown element media type {}", r.name))
                        })?;
                        if !elem_media.views.contains_key(view) {
                            return Err(invalid(format!(
                                "element media type {} has no such view",
                                r.name
                            )));
                        }
                        elem.data_type = DataType::media(r.name.clone(), Some(view));
                    }
                }
            }
            _ => {
                if view != DEFAULT_VIEW {
                    return Err(invalid("only object and array media types have views".into()));
                }
            }
        }

        Ok(Projection {
            reference: DataType::Media(MediaRef {
                name: mt.type_name.clone(),
                view: (view != DEFAULT_VIEW).then(|| view.to_string()),
            }),
            identifier: format!("{}; view={}", mt.identifier, view),
            attribute,
        })
    }

    /// Structure of a type as seen through its reference: a media type
    /// referenced with a view resolves to its projection onto that view.
    pub fn viewed(&self, t: &DataType) -> Result<DataType> {
        if let DataType::Media(r) = t {
            if !r.is_default_view() {
                let mt = self.media_type(&r.name).ok_or_else(|| Error::UnknownTypeKind {
                    name: r.name.clone(),
                    context: "a media type reference".into(),
                })?;
                let projected = self.project(mt, r.view())?.attribute.data_type;
                return Ok(self.underlying(&projected)?.clone());
            }
        }
        Ok(self.underlying(t)?.clone())
    }

    /// Render a media attribute of a projection through `view`
    fn view_field(&self, field: &mut Attribute, view: &str) -> std::result::Result<(), String> {
        let DataType::Media(r) = &field.data_type else {
            return Err(format!("{} is not a media type", field.data_type.name()));
        };
        let nested = self
            .media_type(&r.name)
            .ok_or_else(|| format!("unknown media type {}", r.name))?;
        if view != DEFAULT_VIEW && !nested.views.contains_key(view) {
            return Err(format!("media type {} has no view {}", r.name, view));
        }
        field.data_type = DataType::media(r.name.clone(), Some(view));
        Ok(())
    }
}
