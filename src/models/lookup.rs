use serde::Serialize;

/// Outcome of assembling data for a page.
///
/// `NotFound` is the ordinary "no data" state (an out-of-range round, an
/// empty round list). `Error` carries the reason an upstream fetch failed so
/// the page can show a "missing data" message instead of failing the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Error(String),
}

impl<T> Lookup<T> {
    /// Splits off the found value; anything else is handed back retyped so
    /// a handler can return it as its own page result.
    pub fn into_result<U>(self) -> Result<T, Lookup<U>> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound => Err(Lookup::NotFound),
            Lookup::Error(reason) => Err(Lookup::Error(reason)),
        }
    }

    #[cfg(test)]
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}
