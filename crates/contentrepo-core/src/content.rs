use crate::value::ContentId;
use derive_more::Deref;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;

///
/// ContentType
///
/// A repository item type a collection proxy can be scoped to.
/// `TYPE_NAME` is the repository-side type name used by type filters.
///

pub trait ContentType: DeserializeOwned + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
}

///
/// Content
///
/// Untyped repository item: the well-known fields plus every other field the
/// server returned.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Content {
    pub id: Option<ContentId>,
    pub path: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub content_type: Option<String>,

    #[deref]
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Content {
    /// Value of an arbitrary field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

impl ContentType for Content {
    const TYPE_NAME: &'static str = "GenericContent";
}
