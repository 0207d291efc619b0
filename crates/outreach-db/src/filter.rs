//! Rendering of core filters into SurrealQL.
//!
//! Every value is passed as a bound parameter (`$f0`, `$f1`, ...); user
//! input never reaches the statement text.

use outreach_core::query::{Clause, Field, Filter, FindOptions, SortDirection};

/// A SELECT statement with its string bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectStatement {
    pub sql: String,
    pub bindings: Vec<(String, String)>,
    /// Bound as `$limit` when present.
    pub limit: Option<u64>,
}

fn column(field: Field) -> &'static str {
    match field {
        Field::Tenant => "organization_id",
        Field::EventName => "event_name",
        Field::EventDate => "date",
        Field::Attendees => "attendees",
        Field::FirstName => "first_name",
        Field::LastName => "last_name",
        Field::PrimaryPhone => "primary_phone",
        Field::UpdatedAt => "updated_at",
    }
}

/// Wraps a predicate on `primary_phone` so it holds for any entry of
/// `phone_numbers`.
fn on_phone_entries(field: Field, predicate: String) -> String {
    if field == Field::PrimaryPhone {
        format!("array::len(phone_numbers[WHERE {predicate}]) > 0")
    } else {
        predicate
    }
}

fn render_clause(index: usize, clause: &Clause, bindings: &mut Vec<(String, String)>) -> String {
    let param = format!("f{index}");
    match clause {
        Clause::Eq(field, value) => {
            bindings.push((param.clone(), value.clone()));
            on_phone_entries(*field, format!("{} = ${param}", column(*field)))
        }
        Clause::PrefixCi(field, value) => {
            bindings.push((param.clone(), value.clone()));
            on_phone_entries(
                *field,
                format!(
                    "string::starts_with(string::lowercase({}), ${param})",
                    column(*field)
                ),
            )
        }
        Clause::Range { field, from, to } => {
            bindings.push((format!("{param}_from"), from.clone()));
            bindings.push((format!("{param}_to"), to.clone()));
            let col = column(*field);
            on_phone_entries(
                *field,
                format!("{col} >= ${param}_from AND {col} < ${param}_to"),
            )
        }
        Clause::Contains(field, value) => {
            bindings.push((param.clone(), value.clone()));
            format!("{} CONTAINS ${param}", column(*field))
        }
    }
}

/// Build `SELECT meta::id(id) AS record_id, * FROM <table> ...` for a
/// filter and its find options.
pub(crate) fn select_statement(
    table: &str,
    filter: &Filter,
    options: &FindOptions,
) -> SelectStatement {
    let mut bindings = Vec::new();
    let mut sql = format!("SELECT meta::id(id) AS record_id, * FROM {table}");

    let predicates: Vec<String> = filter
        .clauses()
        .iter()
        .enumerate()
        .map(|(i, clause)| render_clause(i, clause, &mut bindings))
        .collect();
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    if let Some(sort) = options.sort {
        let direction = match sort.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {} {direction}", column(sort.field)));
    }

    if options.limit.is_some() {
        sql.push_str(" LIMIT $limit");
    }

    SelectStatement {
        sql,
        bindings,
        limit: options.limit,
    }
}
