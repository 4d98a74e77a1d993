//! Query-string construction.
//!
//! Every parameter is optional on the wire: empty strings, empty lists and
//! zero pagination values are left out entirely rather than sent empty.

use ngsi2_model::GeoQuery;
use url::Url;

/// Ordered query parameters for one request.
///
/// `options` values accumulate and are sent once, comma-joined, after the
/// other parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
    options: Vec<&'static str>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name=value` unless `value` is absent or empty.
    pub fn param(&mut self, name: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.pairs.push((name, value.to_owned()));
        }
        self
    }

    /// Add `name=a,b,c` unless `values` is empty.
    pub fn list<S: AsRef<str>>(&mut self, name: &'static str, values: &[S]) -> &mut Self {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(",");
            self.pairs.push((name, joined));
        }
        self
    }

    /// Add `offset`, `limit` (each only when > 0) and `options=count`.
    pub fn pagination(&mut self, pagination: &Pagination) -> &mut Self {
        if pagination.offset > 0 {
            self.pairs.push(("offset", pagination.offset.to_string()));
        }
        if pagination.limit > 0 {
            self.pairs.push(("limit", pagination.limit.to_string()));
        }
        if pagination.count {
            self.option("count");
        }
        self
    }

    /// Add `georel`, `geometry` and `coords` together.
    pub fn geo(&mut self, geo: Option<&GeoQuery>) -> &mut Self {
        if let Some(geo) = geo {
            self.pairs.push(("georel", geo.relation.to_string()));
            self.pairs.push(("geometry", geo.geometry.to_string()));
            self.pairs.push(("coords", geo.coords_param()));
        }
        self
    }

    pub fn option(&mut self, option: &'static str) -> &mut Self {
        if !self.options.contains(&option) {
            self.options.push(option);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.options.is_empty()
    }

    /// Parameters in send order, `options` last.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.pairs.clone();
        if !self.options.is_empty() {
            pairs.push(("options", self.options.join(",")));
        }
        pairs
    }

    /// Replace the query of `url` with these parameters. An empty set
    /// leaves no `?` behind.
    ///
    /// Values are form-urlencoded, so the `,`, `;` and `:` separators go
    /// out as `%2C`, `%3B` and `%3A`. Brokers decode them back before
    /// parsing, and `q` expressions containing `&` or `=` stay intact.
    pub fn apply_to(&self, url: &mut Url) {
        url.set_query(None);
        if self.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (name, value) in self.to_pairs() {
            query.append_pair(name, &value);
        }
    }
}

/// Paging inputs for list operations.
///
/// Zero `offset`/`limit` leave the broker defaults in place. `count` asks
/// the broker for `X-Total-Count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
    pub count: bool,
}

impl Pagination {
    #[must_use]
    pub fn new(offset: u32, limit: u32, count: bool) -> Self {
        Self {
            offset,
            limit,
            count,
        }
    }

    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

/// Filters for `GET /v2/entities`.
///
/// ```ignore
/// let query = EntityQuery::new()
///     .types(["Room"])
///     .q("temperature>30")
///     .pagination(Pagination::new(0, 20, true));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityQuery {
    pub ids: Vec<String>,
    pub id_pattern: Option<String>,
    pub types: Vec<String>,
    pub attrs: Vec<String>,
    /// Simple query language expression, sent as `q`
    pub q: Option<String>,
    pub geo: Option<GeoQuery>,
    pub order_by: Vec<String>,
    pub pagination: Pagination,
}

impl EntityQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn id_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.id_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn attrs(mut self, attrs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn q(mut self, expression: impl Into<String>) -> Self {
        self.q = Some(expression.into());
        self
    }

    #[must_use]
    pub fn geo(mut self, geo: GeoQuery) -> Self {
        self.geo = Some(geo);
        self
    }

    #[must_use]
    pub fn order_by(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.order_by = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .list("id", &self.ids)
            .param("idPattern", self.id_pattern.as_deref())
            .list("type", &self.types)
            .list("attrs", &self.attrs)
            .param("q", self.q.as_deref())
            .geo(self.geo.as_ref())
            .list("orderBy", &self.order_by)
            .pagination(&self.pagination);
        params
    }
}
