//! Type references

use super::{jsify, TypeMapper};
use crate::design::{Attribute, DataType, MediaRef, MediaType, Primitive};
use crate::error::{Error, Result};

const COLLECTION_SUFFIX: &str = "Collection";

/// Flow spelling of a primitive type
pub fn native_type(p: Primitive) -> &'static str {
    match p {
        Primitive::Boolean => "boolean",
        Primitive::Integer | Primitive::Number => "number",
        Primitive::String | Primitive::DateTime | Primitive::Uuid => "string",
        Primitive::Any => "any",
    }
}

impl TypeMapper<'_> {
    /// Name used to refer to a type.
    ///
    /// Named types render as their normalized name, lower-first when
    /// `private`. Anonymous objects render inline, with `required` as the
    /// required set of their fields.
    pub fn type_name(
        &self,
        t: &DataType,
        required: &[String],
        tabs: usize,
        private: bool,
    ) -> Result<String> {
        match t {
            DataType::Primitive(p) => Ok(native_type(*p).to_string()),
            DataType::Array(elem) => Ok(format!(
                "Array<{}>",
                self.type_name(&elem.data_type, &elem.required, tabs + 1, private)?
            )),
            DataType::Hash(hash) => Ok(format!(
                "{{[{}]: {}}}",
                self.type_name(&hash.key.data_type, &hash.key.required, tabs + 1, private)?,
                self.type_name(&hash.elem.data_type, &hash.elem.required, tabs + 1, private)?
            )),
            DataType::Object(_) => {
                let mut att = Attribute::new(t.clone());
                att.merge_required(required);
                self.type_def(&att, tabs, false, private)
            }
            DataType::User(name) => {
                if self.design.user_type(name).is_none() {
                    return Err(Error::UnknownTypeKind {
                        name: name.clone(),
                        context: "type name".into(),
                    });
                }
                jsify(name, !private)
            }
            DataType::Media(r) => {
                let mt = self
                    .design
                    .media_type(&r.name)
                    .ok_or_else(|| Error::UnknownTypeKind {
                        name: r.name.clone(),
                        context: "type name".into(),
                    })?;
                if mt.is_error() {
                    return Ok("error".to_string());
                }
                self.media_name(mt, r, !private)
            }
        }
    }

    /// Name of a media type seen through a view. The view of a collection
    /// named `<Elem>Collection` goes before the suffix, as in
    /// `AircraftMediaLinkCollection`.
    pub(crate) fn media_name(&self, mt: &MediaType, r: &MediaRef, upper: bool) -> Result<String> {
        let name = jsify(&r.name, upper)?;
        if r.is_default_view() {
            return Ok(name);
        }
        let view = jsify(r.view(), true)?;
        if matches!(mt.attribute.data_type, DataType::Array(_)) {
            if let Some(base) = name.strip_suffix(COLLECTION_SUFFIX) {
                return Ok(format!("{}{}{}", base, view, COLLECTION_SUFFIX));
            }
        }
        Ok(format!("{}{}", name, view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;
    use crate::jsgen::RenderConfig;

    fn design() -> Design {
        Design::from_yaml(
            r#"
name: names
types:
  address_form:
    type: { object: { city: { type: string } } }
  Loop:
    type: { object: { next: { type: Loop } } }
media_types:
  AircraftMedia:
    identifier: application/vnd.aircraft+json
    type: { object: { id: { type: integer }, name: { type: string } } }
    views:
      link: { attributes: [name] }
  AircraftMediaCollection:
    identifier: application/vnd.aircraft+json; type=collection
    type: { array: { type: AircraftMedia } }
    views:
      link: {}
  Fleet:
    identifier: application/vnd.fleet+json
    type: { array: { type: AircraftMedia } }
    views:
      link: {}
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_primitives() {
        let d = design();
        let config = RenderConfig::default();
        let m = TypeMapper::new(&d, &config);
        let cases = [
            (Primitive::Boolean, "boolean"),
            (Primitive::Integer, "number"),
            (Primitive::Number, "number"),
            (Primitive::String, "string"),
            (Primitive::DateTime, "string"),
            (Primitive::Uuid, "string"),
            (Primitive::Any, "any"),
        ];
        for (p, expected) in cases {
            assert_eq!(m.type_name(&DataType::Primitive(p), &[], 0, false).unwrap(), expected);
        }
    }

    #[test]
    fn test_containers() {
        let d = design();
        let config = RenderConfig::default();
        let m = TypeMapper::new(&d, &config);
        let arr = DataType::array_of(DataType::string());
        assert_eq!(m.type_name(&arr, &[], 0, false).unwrap(), "Array<string>");
        let hash = DataType::hash_of(DataType::string(), DataType::Primitive(Primitive::Any));
        assert_eq!(m.type_name(&hash, &[], 0, false).unwrap(), "{[string]: any}");
    }

    #[test]
    fn test_named_types() {
        let d = design();
        let config = RenderConfig::default();
        let m = TypeMapper::new(&d, &config);
        let user = DataType::user("address_form");
        assert_eq!(m.type_name(&user, &[], 0, false).unwrap(), "AddressForm");
        assert_eq!(m.type_name(&user, &[], 0, true).unwrap(), "addressForm");
        let media = DataType::media("AircraftMedia", Some("link"));
        assert_eq!(m.type_name(&media, &[], 0, false).unwrap(), "AircraftMediaLink");
        let collection = DataType::media("AircraftMediaCollection", Some("link"));
        assert_eq!(
            m.type_name(&collection, &[], 0, false).unwrap(),
            "AircraftMediaLinkCollection"
        );
        let fleet = DataType::media("Fleet", Some("link"));
        assert_eq!(m.type_name(&fleet, &[], 0, false).unwrap(), "FleetLink");
        let error = DataType::media("error", None);
        assert_eq!(m.type_name(&error, &[], 0, false).unwrap(), "error");
    }

    #[test]
    fn test_cycle_renders_by_name() {
        let d = design();
        let config = RenderConfig::default();
        let m = TypeMapper::new(&d, &config);
        let arr = DataType::array_of(DataType::user("Loop"));
        assert_eq!(m.type_name(&arr, &[], 0, false).unwrap(), "Array<Loop>");
    }

    #[test]
    fn test_anonymous_object_inline() {
        let d = design();
        let config = RenderConfig {
            optional_fields: true,
            ..RenderConfig::default()
        };
        let m = TypeMapper::new(&d, &config);
        let obj = DataType::object([
            ("a", Attribute::new(DataType::string())),
            ("b", Attribute::new(DataType::integer())),
        ]);
        assert_eq!(
            m.type_name(&obj, &["a".to_string()], 0, false).unwrap(),
            "{\n  a: string,\n  b?: number,\n}"
        );
    }

    #[test]
    fn test_unknown_reference_fails() {
        let d = design();
        let config = RenderConfig::default();
        let m = TypeMapper::new(&d, &config);
        let err = m.type_name(&DataType::user("Nope"), &[], 0, false).unwrap_err();
        assert!(err.is_defect());
    }
}
