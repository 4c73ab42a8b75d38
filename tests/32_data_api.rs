mod common;

use anyhow::Result;
use serde_json::json;

use proeduc_admin::membership::{MembershipSet, Relation};
use proeduc_admin::models::{AdminCreatePayload, AdminUpdatePayload, GroupCreatePayload, WebhookStatus};
use proeduc_admin::services::{
    AdminService, DashboardOverview, GroupService, SchoolService, StudentQuery, StudentService, WebhookService,
};
use proeduc_admin::ClientError;

#[tokio::test]
async fn requests_carry_bearer_and_tenant_headers() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    client.session().set_school_id(Some("s1"))?;

    SchoolService::new(&client).list(None).await?;
    let last = backend.mock.requests().pop().expect("recorded request");
    assert_eq!(last.path, "/schools");
    assert_eq!(last.school_id.as_deref(), Some("s1"));
    let token = backend.mock.state().token.clone();
    assert_eq!(last.authorization, Some(format!("Bearer {}", token)));

    // no tenant selected, no header
    client.session().set_school_id(None)?;
    SchoolService::new(&client).list(None).await?;
    assert_eq!(backend.mock.requests().pop().expect("recorded request").school_id, None);
    Ok(())
}

#[tokio::test]
async fn lists_accept_envelopes_and_bare_arrays() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();

    let schools = SchoolService::new(&client).list(None).await?;
    assert_eq!(schools.items.len(), 2);
    assert_eq!(schools.per_page, Some(50));
    assert_eq!(schools.total_count(), 2);
    assert_eq!(schools.items[1].student_count, 80);

    backend.mock.state().bare_lists = true;
    let admins = AdminService::new(&client).list().await?;
    assert_eq!(admins.items.len(), 3);
    assert_eq!(admins.count, None);
    assert_eq!(admins.total_count(), 3);

    let groups = GroupService::new(&client).get_all().await?;
    assert_eq!(groups.items.len(), 2);
    assert!(groups.items[0].is_active());
    assert!(!groups.items[1].is_active());
    Ok(())
}

#[tokio::test]
async fn admin_lifecycle() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    let admins = AdminService::new(&client);

    let payload = AdminCreatePayload {
        name: "Diego".to_string(),
        email: "diego@proeduc.test".to_string(),
        password: "123456".to_string(),
        password_confirmation: "123456".to_string(),
        groups: vec![],
    };
    let created = admins.create(&payload).await?;
    assert_eq!(created.email, "diego@proeduc.test");
    assert_eq!(backend.mock.last_body("/admins").expect("create body")["passwordConfirmation"], "123456");

    let duplicate = admins.create(&payload).await.unwrap_err();
    assert_eq!(duplicate.status_code(), Some(400));
    assert_eq!(duplicate.to_string(), "E-mail already in use");

    let update = AdminUpdatePayload { name: Some("Diego Lima".to_string()), ..Default::default() };
    let updated = admins.update(&created.id, &update).await?;
    assert_eq!(updated.name, "Diego Lima");
    let body = backend.mock.last_body(&format!("/admins/{}", created.id)).expect("update body");
    assert_eq!(body, json!({"name": "Diego Lima"}));

    admins.delete(&created.id).await?;
    let missing = admins.detail(&created.id).await.unwrap_err();
    assert_eq!(missing.error_code(), "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn invalid_admin_is_never_sent() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    let before = backend.mock.requests().len();

    let payload = AdminCreatePayload {
        name: " ".to_string(),
        email: "no-at-sign".to_string(),
        password: "123".to_string(),
        password_confirmation: "321".to_string(),
        groups: vec![],
    };
    match AdminService::new(&client).create(&payload).await.unwrap_err() {
        ClientError::Validation { field_errors, .. } => {
            let fields: Vec<&str> = field_errors.keys().map(String::as_str).collect();
            assert_eq!(fields, ["email", "name", "password", "passwordConfirmation"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(backend.mock.requests().len(), before);
    Ok(())
}

#[tokio::test]
async fn deleted_school_can_be_recovered() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    let schools = SchoolService::new(&client);

    schools.delete("s2").await?;
    assert_eq!(schools.list(None).await?.items.len(), 1);
    assert_eq!(schools.get("s2").await.unwrap_err().status_code(), Some(404));

    schools.recover("s2").await?;
    let restored = schools.get("s2").await?;
    assert_eq!(restored.name, "Escola Beta");
    Ok(())
}

#[tokio::test]
async fn membership_edits_send_the_full_set() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    let groups = GroupService::new(&client);

    let group = groups.get("g1").await?;
    let current = MembershipSet::from_ids(group.school_ids());
    assert_eq!(current.len(), 2);

    // dropping one school still sends the survivor
    let next = current.toggled("s1");
    let updated = groups.replace_members("g1", Relation::GroupSchools, &next).await?;
    assert_eq!(updated.school_ids(), ["s2"]);
    assert_eq!(backend.mock.last_body("/group/g1").expect("update body"), json!({"schools": ["s2"]}));

    // adding an admin keeps the existing one
    let admins = MembershipSet::from_ids(updated.admin_ids()).toggled("a2");
    let updated = groups.replace_members("g1", Relation::GroupAdmins, &admins).await?;
    assert_eq!(updated.admin_ids(), ["a1", "a2"]);
    assert_eq!(backend.mock.last_body("/group/g1").expect("update body"), json!({"admins": ["a1", "a2"]}));

    // a relation owned by the other side is refused locally
    let before = backend.mock.requests().len();
    let err = groups.replace_members("g1", Relation::SchoolEmployees, &admins).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation { .. }));
    assert_eq!(backend.mock.requests().len(), before);
    Ok(())
}

#[tokio::test]
async fn school_and_admin_memberships() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();

    let employees = MembershipSet::from_ids(["a2", "a3"]);
    let school = SchoolService::new(&client)
        .replace_members("s1", Relation::SchoolEmployees, &employees)
        .await?;
    assert_eq!(school.employee_ids(), ["a2", "a3"]);
    assert_eq!(backend.mock.last_body("/schools/s1").expect("body"), json!({"employees": ["a2", "a3"]}));

    let admin = AdminService::new(&client)
        .replace_groups("a2", &MembershipSet::from_ids(["g2"]))
        .await?;
    assert_eq!(admin.group_ids(), ["g2"]);
    assert_eq!(backend.mock.last_body("/admins/a2").expect("body"), json!({"groups": ["g2"]}));

    // clearing every group still sends an explicit empty list
    let admin = AdminService::new(&client).replace_groups("a2", &MembershipSet::new()).await?;
    assert!(admin.group_ids().is_empty());
    assert_eq!(backend.mock.last_body("/admins/a2").expect("body"), json!({"groups": []}));
    Ok(())
}

#[tokio::test]
async fn group_create_requires_a_name() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    let groups = GroupService::new(&client);

    let blank = GroupCreatePayload { name: "  ".to_string(), admins: vec![], schools: vec![] };
    assert!(matches!(groups.create(&blank).await.unwrap_err(), ClientError::Validation { .. }));

    let payload = GroupCreatePayload { name: "Rede Leste".to_string(), admins: vec!["a1".to_string()], schools: vec![] };
    let created = groups.create(&payload).await?;
    assert_eq!(created.name, "Rede Leste");
    assert_eq!(groups.get_all().await?.items.len(), 3);
    Ok(())
}

#[tokio::test]
async fn students_are_paged_by_the_backend() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    client.session().set_school_id(Some("s1"))?;
    let students = StudentService::new(&client);

    let query = StudentQuery { page_index: 2, per_page: 10, ..Default::default() };
    let page = students.list(&query).await?;
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_count(), 23);
    let last = backend.mock.requests().pop().expect("recorded request");
    let params = last.query.expect("query string");
    assert!(params.contains("page=3"));
    assert!(params.contains("perPage=10"));

    let query = StudentQuery { status: Some("banned".to_string()), ..Default::default() };
    let page = students.list(&query).await?;
    assert_eq!(page.total_count(), 7);
    assert!(page.items.iter().all(|s| s.normalized_status() == "banned"));
    let last = backend.mock.requests().pop().expect("recorded request");
    assert!(last.query.expect("query string").contains("status=Cancelado"));
    Ok(())
}

#[tokio::test]
async fn webhooks_list_report_and_enable() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    let webhooks = WebhookService::new(&client);

    let mine = webhooks.list_mine(Some(10), None).await?;
    assert_eq!(mine.data.len(), 1);
    assert!(mine.data[0].interrupted);

    let report = webhooks.list_all(None, None, None).await?;
    assert_eq!(report.items.len(), 2);
    let failed: Vec<_> = report.failed_items().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].error_status, Some(401));

    let active = webhooks.list_all(Some(WebhookStatus::Active), None, None).await?;
    assert_eq!(active.items.len(), 1);
    assert!(active.items[0].ok);

    let enabled = webhooks.enable("wh1").await?;
    assert!(enabled.enabled);
    assert!(!enabled.interrupted);
    Ok(())
}

#[tokio::test]
async fn dashboard_aggregates_collections() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();

    let stats = DashboardOverview::new(&client).load().await?;
    assert_eq!(stats.total_schools, 2);
    assert_eq!(stats.total_groups, 2);
    assert_eq!(stats.total_admins, 3);
    assert_eq!(stats.schools_with_webhook, 1);
    assert_eq!(stats.schools_without_webhook, 1);
    assert_eq!(stats.total_students, 200);
    assert_eq!(stats.total_teachers, 13);
    assert_eq!(stats.total_entries_overdue, 3);
    assert_eq!(stats.total_entries_pending, 7);
    assert_eq!(stats.total_entries_received, 50);
    assert_eq!(stats.schools_by_group.len(), 1);
    assert_eq!(stats.schools_by_group[0].group_name, "Rede Norte");
    assert_eq!(stats.schools_by_group[0].total_schools, 2);
    Ok(())
}

#[tokio::test]
async fn dashboard_fails_when_any_collection_fails() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    backend.mock.state().failing.insert("groups");

    let err = DashboardOverview::new(&client).load().await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.to_string(), "Erro interno");
    Ok(())
}

#[tokio::test]
async fn one_nameless_record_does_not_break_the_list() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = backend.signed_in_client();
    {
        let mut state = backend.mock.state();
        state.admins.push(json!({"id": 99, "name": null, "email": null, "status": "active"}));
        state.schools.push(json!({"id": "s9", "name": null}));
    }

    let admins = AdminService::new(&client).list().await?;
    assert_eq!(admins.items.len(), 4);
    let nameless = admins.items.iter().find(|a| a.id == "99").expect("decoded admin");
    assert_eq!(nameless.name, "");
    assert_eq!(nameless.email, "");

    let schools = SchoolService::new(&client).list(None).await?;
    assert_eq!(schools.items.len(), 3);
    Ok(())
}
