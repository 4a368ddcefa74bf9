use serde::{Deserialize, Serialize};

/// How a material is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MethodType {
    Buy,
    Make,
}

pub mod material {
    use super::*;

    /// Material as sent and received on `/api/materials`.
    ///
    /// `methods` is optional on input: when absent the associations are left
    /// untouched, when present they are replaced by the listed method ids.
    /// Responses always carry the full list.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Material {
        pub id: Option<i64>,
        pub name: Option<String>,
        pub description: Option<String>,
        pub methods: Option<Vec<super::material_method::MaterialMethodRef>>,
    }

    /// Material embedded in a method, without its own method list.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct MaterialRef {
        pub id: Option<i64>,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
    }
}

pub mod material_method {
    use super::*;

    /// Material method as sent and received on `/api/material-methods`.
    ///
    /// The owning material was historically serialized under `name`, which
    /// is still accepted on input.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct MaterialMethod {
        pub id: Option<i64>,
        #[serde(rename = "type")]
        pub method_type: Option<MethodType>,
        #[serde(alias = "name")]
        pub material: Option<super::material::MaterialRef>,
    }

    /// Method embedded in a material, without its back-reference.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct MaterialMethodRef {
        pub id: Option<i64>,
        #[serde(rename = "type", default)]
        pub method_type: Option<MethodType>,
    }
}

pub mod error {
    use super::*;

    /// Body returned with a 400 caused by a rejected request.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ErrorAlert {
        pub title: String,
        pub status: u16,
        pub entity_name: String,
        pub error_key: String,
        /// Translation key, always `error.<error_key>`.
        pub message: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_accepts_legacy_name_key() {
        let method: material_method::MaterialMethod =
            serde_json::from_str(r#"{"type":"MAKE","name":{"id":4}}"#).unwrap();
        assert_eq!(method.method_type, Some(MethodType::Make));
        assert_eq!(method.material.and_then(|m| m.id), Some(4));
    }

    #[test]
    fn method_type_rejects_unknown_variant() {
        let res = serde_json::from_str::<material_method::MaterialMethod>(r#"{"type":"STEAL"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn absent_methods_stay_absent() {
        let material: material::Material =
            serde_json::from_str(r#"{"name":"thermostat"}"#).unwrap();
        assert!(material.methods.is_none());
        assert_eq!(material.name.as_deref(), Some("thermostat"));
    }
}
