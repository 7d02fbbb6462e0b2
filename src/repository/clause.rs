//! Dynamic WHERE/SET clause assembly for filtered reads and partial updates.
//!
//! Every optional filter/update field in the system funnels through
//! [`ClauseBuilder`]: a field that is absent (or fails its validity
//! predicate) contributes nothing, a field that is present contributes an
//! ordinal `$n` placeholder fragment plus a deferred bind value. Values are
//! never concatenated into the SQL text.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::Postgres;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A value waiting to be bound onto a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    SmallInt(i16),
    Decimal(Decimal),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<i16> for SqlParam {
    fn from(v: i16) -> Self {
        SqlParam::SmallInt(v)
    }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self {
        SqlParam::Decimal(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(v)
    }
}

impl From<Uuid> for SqlParam {
    fn from(v: Uuid) -> Self {
        SqlParam::Uuid(v)
    }
}

/// Collects qualifying `(expression, value)` pairs and renders them as a
/// parameterized WHERE or SET clause.
#[derive(Debug, Default)]
pub struct ClauseBuilder {
    fragments: Vec<String>,
    params: Vec<SqlParam>,
}

impl ClauseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include `expr` (e.g. `"rating >="`) when the value is present.
    /// The next ordinal placeholder is appended to the expression.
    pub fn push<T: Into<SqlParam>>(&mut self, expr: &str, value: Option<T>) -> &mut Self {
        self.push_if(expr, value, |_| true)
    }

    /// Include `expr` only when the value is present and passes `valid`.
    pub fn push_if<T: Into<SqlParam>>(
        &mut self,
        expr: &str,
        value: Option<T>,
        valid: impl FnOnce(&T) -> bool,
    ) -> &mut Self {
        if let Some(v) = value {
            if valid(&v) {
                let index = self.next_index();
                self.fragments.push(format!("{} ${}", expr, index));
                self.params.push(v.into());
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Ordinal of the next placeholder; callers appending trailing
    /// parameters (`WHERE id = $n` after a SET clause) continue from here.
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// AND-joined filter clause. Empty when no field qualified: the read
    /// degenerates to "no constraint" and matches every row.
    pub fn where_clause(&self) -> String {
        if self.fragments.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.fragments.join(" AND "))
        }
    }

    /// Comma-joined assignment clause. A SET clause with zero assignments is
    /// invalid SQL, so an empty builder is an error here.
    pub fn set_clause(&self) -> AppResult<String> {
        if self.fragments.is_empty() {
            Err(AppError::NoFieldsToUpdate)
        } else {
            Ok(format!(" SET {}", self.fragments.join(", ")))
        }
    }

    /// Bind the collected values, in placeholder order, onto a query.
    pub fn bind_to<'q>(
        &self,
        mut query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        for param in &self.params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::SmallInt(v) => query.bind(*v),
                SqlParam::Decimal(v) => query.bind(*v),
                SqlParam::Date(v) => query.bind(*v),
                SqlParam::Timestamp(v) => query.bind(*v),
                SqlParam::Uuid(v) => query.bind(*v),
            };
        }
        query
    }

    /// Same as [`bind_to`](Self::bind_to) for typed row queries.
    pub fn bind_to_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for param in &self.params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::SmallInt(v) => query.bind(*v),
                SqlParam::Decimal(v) => query.bind(*v),
                SqlParam::Date(v) => query.bind(*v),
                SqlParam::Timestamp(v) => query.bind(*v),
                SqlParam::Uuid(v) => query.bind(*v),
            };
        }
        query
    }

    #[cfg(test)]
    pub(crate) fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{is_valid_price, is_valid_rating};

    #[test]
    fn absent_fields_contribute_nothing() {
        let mut builder = ClauseBuilder::new();
        builder
            .push("genre =", None::<&str>)
            .push("author =", Some("Le Guin"))
            .push_if("rating >=", None::<i16>, is_valid_rating);

        assert_eq!(builder.where_clause(), " WHERE author = $1");
        assert_eq!(builder.params(), &[SqlParam::Text("Le Guin".to_string())]);
    }

    #[test]
    fn placeholders_are_numbered_in_inclusion_order() {
        let mut builder = ClauseBuilder::new();
        builder
            .push_if("rating >=", Some(2i16), is_valid_rating)
            .push_if("rating <=", Some(4i16), is_valid_rating)
            .push("genre =", Some("fantasy"));

        assert_eq!(
            builder.where_clause(),
            " WHERE rating >= $1 AND rating <= $2 AND genre = $3"
        );
        assert_eq!(builder.next_index(), 4);
    }

    #[test]
    fn invalid_values_are_skipped() {
        let mut builder = ClauseBuilder::new();
        builder
            .push_if("rating >=", Some(0i16), is_valid_rating)
            .push_if("price <=", Some(Decimal::new(-5, 0)), is_valid_price);

        assert!(builder.is_empty());
        assert_eq!(builder.where_clause(), "");
    }

    #[test]
    fn empty_filter_matches_all_rows() {
        let builder = ClauseBuilder::new();
        assert_eq!(builder.where_clause(), "");
        assert_eq!(builder.next_index(), 1);
    }

    #[test]
    fn empty_update_is_an_error() {
        let builder = ClauseBuilder::new();
        assert!(matches!(
            builder.set_clause(),
            Err(AppError::NoFieldsToUpdate)
        ));
    }

    #[test]
    fn set_clause_is_comma_joined() {
        let mut builder = ClauseBuilder::new();
        builder
            .push("title =", Some("Updated"))
            .push("edition =", Some(2i16));

        assert_eq!(builder.set_clause().unwrap(), " SET title = $1, edition = $2");
        // trailing WHERE parameter continues the numbering
        assert_eq!(builder.next_index(), 3);
    }

    #[test]
    fn range_bounds_are_independent() {
        let mut lower_only = ClauseBuilder::new();
        lower_only
            .push("borrow_date >=", Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
            .push("borrow_date <=", None::<NaiveDate>);
        assert_eq!(lower_only.where_clause(), " WHERE borrow_date >= $1");

        let mut upper_only = ClauseBuilder::new();
        upper_only
            .push("borrow_date >=", None::<NaiveDate>)
            .push("borrow_date <=", Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        assert_eq!(upper_only.where_clause(), " WHERE borrow_date <= $1");
    }
}
