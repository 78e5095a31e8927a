use payloads::QueryParams;
use std::borrow::Cow;
use std::fmt;

/// Identifies one cache entry: a resource name plus the canonical query
/// pairs of its parameters.
///
/// Two keys built from filters with the same effective values are equal, and
/// keys built from different values never are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: Cow<'static, str>,
    params: Vec<(&'static str, String)>,
}

impl QueryKey {
    pub fn new(resource: impl Into<Cow<'static, str>>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
        }
    }

    /// A key for a resource under the given parameters.
    pub fn with_params(
        resource: impl Into<Cow<'static, str>>,
        params: &impl QueryParams,
    ) -> Self {
        Self {
            resource: resource.into(),
            params: params.query_pairs(),
        }
    }

    /// A key for a single entity of a resource family, e.g. `car:<id>`.
    pub fn entity(
        resource: impl Into<Cow<'static, str>>,
        id: impl fmt::Display,
    ) -> Self {
        Self {
            resource: resource.into(),
            params: vec![("id", id.to_string())],
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    fn entity_id(&self) -> Option<&str> {
        match self.params.as_slice() {
            [("id", id)] => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.entity_id() {
            return write!(f, "{}:{id}", self.resource);
        }
        write!(f, "{}", self.resource)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { ':' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

/// Selects cache entries for invalidation, removal or cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// Every entry of a resource family, whatever its parameters.
    Resource(Cow<'static, str>),
    /// Exactly one entry.
    Exact(QueryKey),
    /// Everything.
    All,
}

impl QueryFilter {
    pub fn resource(resource: impl Into<Cow<'static, str>>) -> Self {
        Self::Resource(resource.into())
    }

    pub fn entity(
        resource: impl Into<Cow<'static, str>>,
        id: impl fmt::Display,
    ) -> Self {
        Self::Exact(QueryKey::entity(resource, id))
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Resource(resource) => key.resource == *resource,
            Self::Exact(exact) => key == exact,
            Self::All => true,
        }
    }
}
