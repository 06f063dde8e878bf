// Builds the checked-in output of `codifyctl generate` for the shop fixture
// and drives it without a cluster.

use codify_core::{sanitize, Kind, ResourceObject};
use codify_runtime::{run_with_args, Deployable};

#[allow(dead_code)]
mod shop {
    include!("../../codegen/tests/golden/shop.rs");
}

const SHOP: &str = include_str!("../../codegen/tests/fixtures/shop.yaml");

fn fixture() -> Vec<ResourceObject> {
    codify_manifest::load(SHOP, None).unwrap().iter().map(sanitize).collect()
}

#[tokio::test]
async fn dry_run_install_rebuilds_the_sanitized_fixture() {
    let mut app = shop::App::new();
    app.install(None).await.unwrap();
    assert_eq!(app.objects(), fixture().as_slice());
    let kinds: Vec<Kind> = app.objects().iter().map(|o| o.kind()).collect();
    assert_eq!(kinds, [Kind::Deployment, Kind::StatefulSet, Kind::PodSecurityPolicy]);
    let keys: Vec<String> = app.objects().iter().map(|o| o.key()).collect();
    assert_eq!(keys, ["shop/web", "shop/db", "restricted"]);
}

#[tokio::test]
async fn claim_templates_survive_the_round_trip() {
    let mut app = shop::App::new();
    app.install(None).await.unwrap();
    let ResourceObject::StatefulSet(db) = &app.objects()[1] else { panic!("not a StatefulSet: {:?}", app.objects()[1]) };
    let spec = db.spec.as_ref().unwrap();
    let claims = spec.volume_claim_templates.as_ref().unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].metadata.name.as_deref(), Some("data"));
    assert!(claims[0].metadata.creation_timestamp.is_none());
    assert!(claims[0].status.is_none());
    let requests = claims[0].spec.as_ref().unwrap().resources.as_ref().unwrap().requests.as_ref().unwrap();
    assert_eq!(requests["storage"].0, "1Gi");
    let rolling = spec.update_strategy.as_ref().unwrap().rolling_update.as_ref().unwrap();
    assert!(rolling.max_unavailable.is_some());
}

#[tokio::test]
async fn generated_command_line_runs_dry() {
    let mut out = Vec::new();
    run_with_args(shop::App::new(), ["shop", "install", "--dry-run"], &mut out).await.unwrap();
    run_with_args(shop::App::new(), ["shop", "uninstall", "--dry-run"], &mut out).await.unwrap();
    assert!(out.is_empty());

    run_with_args(shop::App::new(), ["shop", "output", "-o", "structural"], &mut out).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v.as_array().map(Vec::len), Some(3));
    let claim = &v[1]["spec"]["volumeClaimTemplates"][0];
    assert_eq!(claim["apiVersion"], "v1");
    assert_eq!(claim["kind"], "PersistentVolumeClaim");
    assert_eq!(v[0]["spec"]["template"]["spec"]["topologySpreadConstraints"][0]["minDomains"], 2);

    let mut out = Vec::new();
    run_with_args(shop::App::new(), ["shop", "meta"], &mut out).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["name"], "shop");
    assert_eq!(v["annotations"]["description"], "Web shop and its database.");
}
