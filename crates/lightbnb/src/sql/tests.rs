use super::*;
use crate::param::Param;

#[test]
fn builds_placeholders_in_order() {
    let mut q = sql("SELECT * FROM users WHERE a = ");
    q.push_bind(1).push(" AND b = ").push_bind("x");

    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a = $1 AND b = $2");
    assert_eq!(q.param_count(), 2);
}

#[test]
fn build_keeps_bind_order() {
    let mut q = sql("SELECT * FROM properties WHERE owner_id = ");
    q.push_bind(7_i64).limit(5);

    let built = q.build();
    assert_eq!(
        built.text(),
        "SELECT * FROM properties WHERE owner_id = $1 LIMIT $2"
    );
    assert_eq!(built.params(), &[Param::Int(7), Param::Int(5)]);
    assert!(built.validate().is_ok());
}

#[test]
fn empty_push_is_noop() {
    let mut q = Sql::empty();
    q.push("").push("SELECT 1").push("");
    assert_eq!(q.to_sql(), "SELECT 1");
    assert_eq!(q.param_count(), 0);
}

#[test]
fn query_binds_against_hand_numbered_text() {
    let q = query("INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *")
        .bind("Ada")
        .bind("ada@example.com")
        .bind("secret");

    assert!(q.validate().is_ok());
    assert_eq!(q.params_ref().len(), 3);
    assert_eq!(q.params()[1], Param::from("ada@example.com"));
}

#[test]
fn validate_rejects_missing_values() {
    let q = query("SELECT * FROM users WHERE id = $1 AND email = $2").bind(1);
    let err = q.validate().unwrap_err();
    assert!(matches!(err, crate::DbError::Validation(_)));
}

#[test]
fn validate_rejects_extra_values() {
    let q = query("SELECT * FROM users").bind(1);
    assert!(q.validate().is_err());
}

#[test]
fn max_placeholder_ignores_quoted_text() {
    assert_eq!(max_placeholder("SELECT '$9' , \"$8\" FROM t WHERE a = $2"), 2);
    assert_eq!(max_placeholder("SELECT $1, $1, $12"), 12);
    assert_eq!(max_placeholder("SELECT $$ body $$"), 0);
    assert_eq!(max_placeholder(""), 0);
}

#[test]
fn built_query_is_comparable() {
    let a = query("SELECT $1").bind("x");
    let b = query("SELECT $1").bind("x");
    assert_eq!(a, b);
    let (text, params) = a.into_parts();
    assert_eq!(text, "SELECT $1");
    assert_eq!(params, vec![Param::Text("x".to_string())]);
}

#[test]
fn builder_validates_structurally() {
    let mut q = sql("SELECT * FROM users -- owner $9\nWHERE id = ");
    q.push_bind(1);
    assert!(q.validate().is_ok());
    assert!(Sql::empty().validate().is_ok());
}

#[test]
fn max_placeholder_skips_comments() {
    assert_eq!(max_placeholder("SELECT * FROM t -- by $2\nWHERE id = $1"), 1);
    assert_eq!(max_placeholder("SELECT /* $4 /* $5 */ $6 */ $1"), 1);
    assert_eq!(max_placeholder("SELECT $1 -- trailing $3"), 1);
}

#[test]
fn max_placeholder_skips_dollar_quoted_bodies() {
    assert_eq!(max_placeholder("SELECT $tag$ costs $5 $tag$, $1::int"), 1);
    assert_eq!(max_placeholder("SELECT $$ it's $7 $$, $2"), 2);
}

#[test]
fn max_placeholder_honours_escape_strings() {
    assert_eq!(max_placeholder(r"SELECT E'it\'s $3' AS note, $1::int"), 1);
    assert_eq!(max_placeholder("SELECT 'it''s $3', $2"), 2);
}

#[test]
fn max_placeholder_ignores_dollar_in_identifiers() {
    assert_eq!(max_placeholder("SELECT price$1 FROM t WHERE id = $1"), 1);
}

#[test]
fn commented_statement_validates() {
    let q = query("SELECT * FROM users -- by $2\nWHERE id = $1").bind(1);
    assert!(q.validate().is_ok());
}

#[tokio::test]
async fn execution_leaves_bind_count_to_the_server() {
    let conn = crate::testing::RecordingClient::new();
    let q = query("SELECT * FROM users WHERE id = $1 AND email = $2").bind(1);
    assert!(q.validate().is_err());

    assert!(q.fetch_all(&conn).await.unwrap().is_empty());
    assert_eq!(conn.param_counts(), vec![1]);
}
