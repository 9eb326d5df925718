//! Structural type definitions

use super::{jsify, TypeMapper};
use crate::design::{Attribute, DataType, FIELD_NAME_KEY, FIELD_TYPE_KEY};
use crate::error::Result;
use crate::util::property_key;

/// Name an object field is serialized under
pub(crate) fn field_name<'a>(att: &'a Attribute, name: &'a str) -> &'a str {
    att.meta(FIELD_NAME_KEY)
        .and_then(|values| values.first())
        .map(String::as_str)
        .unwrap_or(name)
}

impl TypeMapper<'_> {
    /// Structural definition of an attribute's type.
    ///
    /// Objects render as a literal with one field per line, indented one
    /// level deeper than `tabs`; the closing brace is indented at `tabs` and
    /// the first line not at all. With `with_docs` field descriptions are
    /// written as comments above their field.
    pub fn type_def(
        &self,
        att: &Attribute,
        tabs: usize,
        with_docs: bool,
        private: bool,
    ) -> Result<String> {
        if let Some(forced) = att.meta(FIELD_TYPE_KEY).and_then(|v| v.first()) {
            return jsify(forced, false);
        }
        match &att.data_type {
            DataType::Primitive(_) => self.type_name(&att.data_type, &[], tabs, private),
            DataType::Array(elem) => Ok(format!(
                "Array<{}>",
                self.type_def(elem, tabs, with_docs, private)?
            )),
            DataType::Hash(hash) => Ok(format!(
                "{{[{}]: {}}}",
                self.type_def(&hash.key, tabs, with_docs, private)?,
                self.type_def(&hash.elem, tabs, with_docs, private)?
            )),
            DataType::Object(fields) => {
                let mut out = String::from("{\n");
                let pad = self.indent(tabs + 1);
                for (name, field) in fields {
                    if with_docs {
                        if let Some(desc) = field.description.as_deref() {
                            for line in desc.trim_end().lines() {
                                out.push_str(format!("{}// {}", pad, line).trim_end());
                                out.push('\n');
                            }
                        }
                    }
                    let optional = self.config.optional_fields && !att.is_required(name);
                    out.push_str(&format!(
                        "{}{}{}: {},\n",
                        pad,
                        property_key(field_name(field, name)),
                        if optional { "?" } else { "" },
                        self.type_def(field, tabs + 1, with_docs, private)?
                    ));
                }
                out.push_str(&self.indent(tabs));
                out.push('}');
                Ok(out)
            }
            DataType::User(_) | DataType::Media(_) => {
                let required = self.design.required_of(&att.data_type)?;
                self.type_name(&att.data_type, &required, tabs, private)
            }
        }
    }
}
