use serde::{Deserialize, Serialize};
use shared::pagination::{PageRequest, PageWindow};

/// `?page=&pageSize=` query parameters. Missing values default to `0` and
/// are then normalized like any other out-of-range value.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
}

impl PageQuery {
    pub fn window(self) -> PageWindow {
        PageRequest::from(self).normalize()
    }
}

impl From<PageQuery> for PageRequest {
    fn from(value: PageQuery) -> Self {
        PageRequest::new(value.page, value.page_size)
    }
}
