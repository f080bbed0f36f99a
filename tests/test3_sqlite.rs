#![cfg(feature = "sqlite")]

mod common;

use common::Contact;
use sqlbind::prelude::*;
use tempfile::tempdir;

async fn contacts_db() -> Result<Connection, SqlBindError> {
    let conn = Connection::sqlite_builder(":memory:").build().await?;
    conn.create_table::<Contact>().await?;
    Ok(conn)
}

#[tokio::test]
async fn insert_reports_generated_key() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;

    let changes = conn
        .insert(
            &Contact::new("John", Some("john@example.org")),
            &InsertOptions::default(),
        )
        .await?;
    assert_eq!(
        changes,
        Changes {
            changes: 1,
            last_insert_rowid: 1
        }
    );

    let all = conn
        .all(Query::raw(r#"SELECT * FROM "Contact""#).into_type::<Contact>())
        .await?;
    assert_eq!(
        all,
        vec![Contact {
            id: Some(1),
            first_name: "John".into(),
            email: Some("john@example.org".into()),
        }]
    );
    Ok(())
}

#[tokio::test]
async fn insert_all_then_update_and_delete() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;
    let rows = vec![
        Contact::new("A", None),
        Contact::new("B", None),
        Contact::new("C", Some("c@x")),
    ];

    let changes = conn.insert_all(&rows, &InsertOptions::default()).await?;
    assert_eq!(changes.changes, 3);
    assert_eq!(changes.last_insert_rowid, 3);

    let mut b = conn
        .one(
            Query::named(
                r#"SELECT * FROM "Contact" WHERE "firstName" = $name"#,
                params! { "name" => "B" },
            )
            .into_type::<Contact>(),
        )
        .await?
        .ok_or_else(|| SqlBindError::RowMapping("B not found".into()))?;
    b.first_name = "ignored".into();
    b.email = Some("b@x".into());

    let updated = conn
        .update(&b, &UpdateOptions::only_props(["email"]))
        .await?;
    assert_eq!(updated.changes, 1);
    let stored = conn
        .array(sql!(
            r#"SELECT "firstName", "email" FROM "Contact" WHERE "id" = {}"#,
            2
        ))
        .await?;
    assert_eq!(
        stored,
        Some(vec![RowValues::Text("B".into()), RowValues::Text("b@x".into())])
    );

    assert_eq!(conn.delete(&b).await?.changes, 1);
    assert_eq!(conn.delete(&b).await?.changes, 0);

    let ids = conn
        .column(Query::raw(r#"SELECT "id" FROM "Contact" ORDER BY "id""#))
        .await?;
    assert_eq!(ids, vec![RowValues::Int(1), RowValues::Int(3)]);
    Ok(())
}

#[tokio::test]
async fn scalar_and_positional_arguments() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;
    conn.insert_all(
        &[Contact::new("A", None), Contact::new("B", None)],
        &InsertOptions::default(),
    )
    .await?;

    let stmt = conn.prepare_named(
        r#"SELECT "firstName" FROM "Contact" WHERE "id" = $id"#,
        NamedParams::new(),
    )?;
    assert_eq!(
        stmt.value(RowValues::Int(2)).await?,
        Some(RowValues::Text("B".into()))
    );
    assert_eq!(
        stmt.value(vec![RowValues::Int(1)]).await?,
        Some(RowValues::Text("A".into()))
    );
    assert_eq!(stmt.value(RowValues::Int(99)).await?, None);

    let count = conn
        .value(Query::raw(r#"SELECT COUNT(*) FROM "Contact""#))
        .await?;
    assert_eq!(count, Some(RowValues::Int(2)));

    let arrays = conn
        .arrays(Query::raw(r#"SELECT "id", "firstName" FROM "Contact" ORDER BY "id""#))
        .await?;
    assert_eq!(arrays.len(), 2);
    assert_eq!(arrays[1], vec![RowValues::Int(2), RowValues::Text("B".into())]);
    Ok(())
}

#[tokio::test]
async fn list_and_drop_tables() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;
    assert_eq!(conn.list_tables().await?, vec!["Contact".to_string()]);
    conn.drop_table::<Contact>().await?;
    assert!(conn.list_tables().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn engine_errors_pass_through() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;
    let err = conn
        .run(Query::raw("SELECT * FROM missing_table"))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlBindError::SqliteError(_)));
    Ok(())
}

#[tokio::test]
async fn closed_connection_rejects_calls() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;
    conn.close().await?;
    let err = conn.list_tables().await.unwrap_err();
    assert!(matches!(err, SqlBindError::ConnectionError(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn file_backed_database_persists_across_connections() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempdir()?;
    let path = dir.path().join("contacts.db").to_string_lossy().into_owned();

    let conn = Connection::sqlite_builder(path.clone())
        .naming(NamingStrategy::SnakeCase)
        .build()
        .await?;
    conn.create_table::<Contact>().await?;
    conn.insert(&Contact::new("Zed", None), &InsertOptions::default())
        .await?;
    conn.close().await?;

    let reopened = Connection::sqlite_builder(path).build().await?;
    assert_eq!(reopened.list_tables().await?, vec!["contact".to_string()]);
    let name = reopened
        .value(Query::raw(r#"SELECT "first_name" FROM "contact""#))
        .await?;
    assert_eq!(name, Some(RowValues::Text("Zed".into())));
    Ok(())
}

#[tokio::test]
async fn empty_path_is_config_error() {
    let err = Connection::sqlite_builder("").build().await.unwrap_err();
    assert!(matches!(err, SqlBindError::ConfigError(_)));
}

#[tokio::test]
async fn template_braces_and_comments_reach_sqlite_intact() -> Result<(), SqlBindError> {
    let conn = contacts_db().await?;
    conn.insert(&Contact::new("Kim", None), &InsertOptions::default())
        .await?;

    let row = conn
        .array(sql!(
            r#"SELECT '{{}}' /* /* */, "firstName" FROM "Contact" WHERE "id" = {}"#,
            1
        ))
        .await?;
    assert_eq!(
        row,
        Some(vec![RowValues::Text("{}".into()), RowValues::Text("Kim".into())])
    );

    let flagged: Option<bool> = conn
        .value_as(Query::named(
            r#"SELECT "email" IS NULL FROM "Contact" WHERE "id" = $id"#,
            params! { "id" => 1 },
        ))
        .await?;
    assert_eq!(flagged, Some(true));
    Ok(())
}
