use mockito::Matcher;
use rust_decimal_macros::dec;
use suretrack::config::{BackendConfig, Config};
use suretrack::dto::LegResult;
use suretrack::{BackendApiClient, OperationService};

fn service_for(server: &mockito::ServerGuard) -> OperationService {
    let config = Config {
        backend: BackendConfig {
            url: server.url(),
            api_key: "test_key".to_string(),
            schema: "public".to_string(),
            operator: "alice".to_string(),
        },
    };
    OperationService::new(BackendApiClient::new(config))
}

/// Two-leg operation at version 1: leg 0 open, leg 1 in the given state.
fn operation_row(second_leg: &str) -> String {
    format!(
        r#"[{{
            "id": 10,
            "forma_registro": "ARBITRAGEM",
            "contexto_operacional": "NORMAL",
            "status_operacao": "EM_ABERTO",
            "evento": "Time A x Time B",
            "pernas": [
                {{"bookmaker_id": 1, "odd": 2.0, "stake": 100.0, "moeda": "BRL"}},
                {second_leg}
            ],
            "versao": 1,
            "criado_em": "2026-03-01T12:00:00Z"
        }}]"#
    )
}

fn open_second_leg() -> &'static str {
    r#"{"bookmaker_id": 2, "odd": 1.8, "stake": 50.0, "moeda": "BRL"}"#
}

fn version_cas_matcher() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("id".into(), "eq.10".into()),
        Matcher::UrlEncoded("versao".into(), "eq.1".into()),
    ])
}

#[tokio::test]
async fn test_settle_green_adjusts_bookmaker_balance() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/apostas_unificada")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.10".into()))
        .with_status(200)
        .with_body(operation_row(open_second_leg()))
        .create_async()
        .await;
    let cas = server
        .mock("PATCH", "/rest/v1/apostas_unificada")
        .match_query(version_cas_matcher())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "versao": 2,
            "status_operacao": "EM_ABERTO"
        })))
        .with_status(200)
        .with_body(r#"[{"id": 10}]"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/v1/bookmakers")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "nome": "Pinnacle", "moeda": "BRL",
                 "saldo_atual": 500.0, "saldo_operavel": 450.0}]"#,
        )
        .create_async()
        .await;
    // GREEN on 100 @ 2.00 pays stake * (odd - 1) = 100.
    let balance_patch = server
        .mock("PATCH", "/rest/v1/bookmakers")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "saldo_atual": 600.0
        })))
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "nome": "Pinnacle", "moeda": "BRL",
                 "saldo_atual": 600.0, "saldo_operavel": 550.0}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let operations = service_for(&server);
    let outcome = operations.settle_leg(10, 0, LegResult::Green).await.unwrap();

    cas.assert_async().await;
    balance_patch.assert_async().await;
    assert_eq!(outcome.delta_aplicado, dec!(100));
    // Second leg is still open, the operation stays open.
    assert_eq!(outcome.lucro_total, None);
}

#[tokio::test]
async fn test_concurrent_settlement_loses_version_swap() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/apostas_unificada")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.10".into()))
        .with_status(200)
        .with_body(operation_row(open_second_leg()))
        .create_async()
        .await;
    // Someone else bumped the version in between: zero rows affected.
    server
        .mock("PATCH", "/rest/v1/apostas_unificada")
        .match_query(version_cas_matcher())
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let bookmaker_read = server
        .mock("GET", "/rest/v1/bookmakers")
        .expect(0)
        .create_async()
        .await;

    let operations = service_for(&server);
    let err = operations
        .settle_leg(10, 0, LegResult::Green)
        .await
        .unwrap_err();

    bookmaker_read.assert_async().await;
    assert!(err.is_conflict());
    assert!(err.to_string().contains("settled concurrently"));
}

#[tokio::test]
async fn test_resettle_same_result_applies_nothing() {
    let mut server = mockito::Server::new_async().await;
    // Leg 0 was already settled GREEN with its 100 applied; leg 1 is RED.
    let settled = r#"[{
        "id": 10,
        "forma_registro": "ARBITRAGEM",
        "contexto_operacional": "NORMAL",
        "status_operacao": "EM_ABERTO",
        "pernas": [
            {"bookmaker_id": 1, "odd": 2.0, "stake": 100.0, "moeda": "BRL",
             "resultado": "GREEN", "saldo_aplicado": 100.0},
            {"bookmaker_id": 2, "odd": 1.8, "stake": 50.0, "moeda": "BRL",
             "resultado": "RED", "saldo_aplicado": -50.0}
        ],
        "versao": 1,
        "criado_em": "2026-03-01T12:00:00Z"
    }]"#;
    server
        .mock("GET", "/rest/v1/apostas_unificada")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.10".into()))
        .with_status(200)
        .with_body(settled)
        .create_async()
        .await;
    let cas = server
        .mock("PATCH", "/rest/v1/apostas_unificada")
        .match_query(version_cas_matcher())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "status_operacao": "LIQUIDADA",
            "lucro_total": 50.0
        })))
        .with_status(200)
        .with_body(r#"[{"id": 10}]"#)
        .expect(1)
        .create_async()
        .await;
    // Delta is zero, no bookmaker traffic.
    let bookmaker_read = server
        .mock("GET", "/rest/v1/bookmakers")
        .expect(0)
        .create_async()
        .await;

    let operations = service_for(&server);
    let outcome = operations.settle_leg(10, 0, LegResult::Green).await.unwrap();

    cas.assert_async().await;
    bookmaker_read.assert_async().await;
    assert_eq!(outcome.delta_aplicado, dec!(0));
    assert_eq!(outcome.lucro_total, Some(dec!(50)));
}

#[tokio::test]
async fn test_correcting_result_reverses_previous_application() {
    let mut server = mockito::Server::new_async().await;
    // Leg 0 was wrongly settled GREEN (+100 applied); correcting to RED
    // must net to -100 - 100 = -200 against the bookmaker.
    let settled = r#"[{
        "id": 10,
        "forma_registro": "ARBITRAGEM",
        "contexto_operacional": "NORMAL",
        "status_operacao": "EM_ABERTO",
        "pernas": [
            {"bookmaker_id": 1, "odd": 2.0, "stake": 100.0, "moeda": "BRL",
             "resultado": "GREEN", "saldo_aplicado": 100.0},
            {"bookmaker_id": 2, "odd": 1.8, "stake": 50.0, "moeda": "BRL"}
        ],
        "versao": 3,
        "criado_em": "2026-03-01T12:00:00Z"
    }]"#;
    server
        .mock("GET", "/rest/v1/apostas_unificada")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.10".into()))
        .with_status(200)
        .with_body(settled)
        .create_async()
        .await;
    server
        .mock("PATCH", "/rest/v1/apostas_unificada")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "eq.10".into()),
            Matcher::UrlEncoded("versao".into(), "eq.3".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id": 10}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/v1/bookmakers")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "nome": "Pinnacle", "moeda": "BRL",
                 "saldo_atual": 600.0, "saldo_operavel": 550.0}]"#,
        )
        .create_async()
        .await;
    let balance_patch = server
        .mock("PATCH", "/rest/v1/bookmakers")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "saldo_atual": 400.0
        })))
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "nome": "Pinnacle", "moeda": "BRL",
                 "saldo_atual": 400.0, "saldo_operavel": 350.0}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let operations = service_for(&server);
    let outcome = operations.settle_leg(10, 0, LegResult::Red).await.unwrap();

    balance_patch.assert_async().await;
    assert_eq!(outcome.delta_aplicado, dec!(-200));
}

#[tokio::test]
async fn test_settle_unknown_leg_index() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/apostas_unificada")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.10".into()))
        .with_status(200)
        .with_body(operation_row(open_second_leg()))
        .create_async()
        .await;

    let operations = service_for(&server);
    let err = operations
        .settle_leg(10, 5, LegResult::Void)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no leg 5"));
}
