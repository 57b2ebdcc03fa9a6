//! Repository implementations for database access.
//!
//! Each repository borrows a `PgConnection` (or a transaction, which derefs
//! to one) for its lifetime, and implements [`Repository`] where the table has
//! the usual CRUD shape.

pub mod clientes;
pub mod dashboard_charts;
pub mod dashboard_stats;
pub mod detalles;
pub mod integraciones;
pub mod partial;
pub mod proyectos;
pub mod repository;
pub mod staff;
pub mod tecnologias;
pub mod users;

pub use clientes::Clientes;
pub use dashboard_charts::Charts;
pub use dashboard_stats::DashboardStats;
pub use detalles::Detalles;
pub use integraciones::Integraciones;
pub use proyectos::Proyectos;
pub use repository::Repository;
pub use staff::Staff;
pub use tecnologias::Tecnologias;
pub use users::Users;

/// `ILIKE` pattern matching `search` as a literal substring. Pair with
/// `ESCAPE '\'`.
pub(crate) fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" sso "), "%sso%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
