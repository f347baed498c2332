//! Reusable query definition

use super::{Filter, OrderBy};

/// Filter, paging and ordering for a collection request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Filter>,
    pub top: Option<usize>,
    pub skip: Option<usize>,
    pub orderby: Vec<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn orderby(mut self, order: OrderBy) -> Self {
        self.orderby.push(order);
        self
    }

    /// URL-encoded system query options, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut params = vec!["$format=json".to_string()];

        if let Some(filter) = &self.filter {
            params.push(format!(
                "$filter={}",
                urlencoding::encode(&filter.to_odata_string())
            ));
        }
        if !self.orderby.is_empty() {
            let clauses: Vec<String> = self.orderby.iter().map(|o| o.to_odata_string()).collect();
            params.push(format!(
                "$orderby={}",
                urlencoding::encode(&clauses.join(","))
            ));
        }
        if let Some(top) = self.top {
            params.push(format!("$top={}", top));
        }
        if let Some(skip) = self.skip {
            params.push(format!("$skip={}", skip));
        }

        params.join("&")
    }
}
