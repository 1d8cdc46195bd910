//! Smoke tests against a real TM3 account.
//!
//! Ignored by default. Provide `TM3_SHORTNAME` / `TM3_API_KEY` /
//! `TM3_API_SECRET` in the environment or a `.env` file, then run
//! `cargo test --test live -- --ignored`.

use tm3_api::{Credentials, TmClient};

fn live_client() -> Option<TmClient> {
    let _ = env_logger::try_init();
    dotenvy::dotenv().ok();
    let credentials = Credentials::from_env().ok()?;
    TmClient::new(credentials).ok()
}

#[tokio::test]
#[ignore = "requires a live TM3 account"]
async fn lists_all_contacts() {
    let Some(client) = live_client() else { return };

    let contacts = client.list_all("contacts", None).await.expect("contacts listing");
    println!("{} contacts", contacts.len());
    assert_eq!(client.stats().get, 1);
}

#[tokio::test]
#[ignore = "requires a live TM3 account"]
async fn lists_orders_through_the_lookup_cache() {
    let Some(client) = live_client() else { return };

    let address_types = client.lookup_list("addresstypes", None).await.expect("address types");
    let again = client.lookup_list("addresstypes", None).await.expect("cached address types");
    assert_eq!(address_types, again);
}

#[tokio::test]
#[ignore = "requires a live TM3 account"]
async fn queries_contact_ids() {
    let Some(client) = live_client() else { return };

    let rows = client
        .run_query_all("select id from tm.contact")
        .await
        .expect("contact id query");
    println!("{} rows", rows.len());
}

#[tokio::test]
#[ignore = "requires a live TM3 account"]
async fn exports_contact_ids() {
    let Some(client) = live_client() else { return };

    let rows = client
        .export_query("select id from tm.contact")
        .await
        .expect("contact id export");
    println!("{} exported rows", rows.len());
    assert_eq!(client.stats().export, 1);
}
