//! Scenario tests for the Hydra login flow against a mock administrative API.

#[cfg(test)]
mod integration_tests {
    use crate::{HydraConfig, HydraFlow};
    use nonstick_core::{
        Account, ConsentInfo, FlowError, FlowRequest, LoginFlow, Scope, StaticAccounts,
    };
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{any, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN: &str = "/admin/oauth2/auth/requests/login";
    const LOGIN_ACCEPT: &str = "/admin/oauth2/auth/requests/login/accept";
    const CONSENT: &str = "/admin/oauth2/auth/requests/consent";
    const CONSENT_ACCEPT: &str = "/admin/oauth2/auth/requests/consent/accept";
    const CONSENT_REJECT: &str = "/admin/oauth2/auth/requests/consent/reject";

    async fn setup() -> (MockServer, HydraFlow) {
        let mock_server = MockServer::start().await;
        let accounts = StaticAccounts::new()
            .with_account(Account::new(1000, "jdoe", "Jane Doe"))
            .with_account(Account::new(1001, "prince", "Prince"));
        let flow = HydraFlow::new(&HydraConfig::new(mock_server.uri()), Arc::new(accounts)).unwrap();
        (mock_server, flow)
    }

    fn login_request(challenge: &str) -> FlowRequest {
        FlowRequest::new().with_query_pair("login_challenge", challenge)
    }

    fn consent_request(challenge: &str) -> FlowRequest {
        FlowRequest::new().with_query_pair("consent_challenge", challenge)
    }

    fn redirect_to(url: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "redirect_to": url }))
    }

    async fn mount_consent(server: &MockServer, challenge: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(CONSENT))
            .and(query_param("consent_challenge", challenge))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_pre_login_requires_authentication() {
        let (server, flow) = setup().await;

        Mock::given(method("GET"))
            .and(path(LOGIN))
            .and(query_param("login_challenge", "lc1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "challenge": "lc1",
                "skip": false,
                "subject": "",
                "client": {"client_id": "app"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(LOGIN_ACCEPT))
            .respond_with(redirect_to("/never"))
            .expect(0)
            .mount(&server)
            .await;

        let redirect = flow.pre_login(&login_request("lc1")).await.unwrap();
        assert_eq!(redirect, None);
    }

    #[tokio::test]
    async fn test_pre_login_skip_accepts_known_subject() {
        let (server, flow) = setup().await;

        Mock::given(method("GET"))
            .and(path(LOGIN))
            .and(query_param("login_challenge", "lc2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "challenge": "lc2",
                "skip": true,
                "subject": "1000"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(LOGIN_ACCEPT))
            .and(query_param("login_challenge", "lc2"))
            .and(body_json(json!({
                "subject": "1000",
                "remember": true,
                "remember_for": 30
            })))
            .respond_with(redirect_to("https://hydra/oauth2/auth?login_verifier=v"))
            .expect(1)
            .mount(&server)
            .await;

        let redirect = flow.pre_login(&login_request("lc2")).await.unwrap();
        assert_eq!(
            redirect.as_deref(),
            Some("https://hydra/oauth2/auth?login_verifier=v")
        );
    }

    #[tokio::test]
    async fn test_authenticated_accepts_login() {
        let (server, flow) = setup().await;

        Mock::given(method("PUT"))
            .and(path(LOGIN_ACCEPT))
            .and(query_param("login_challenge", "lc3"))
            .and(body_json(json!({
                "subject": "1001",
                "remember": true,
                "remember_for": 30
            })))
            .respond_with(redirect_to("https://hydra/next"))
            .expect(1)
            .mount(&server)
            .await;

        let redirect = flow
            .authenticated(&login_request("lc3"), "1001")
            .await
            .unwrap();
        assert_eq!(redirect, "https://hydra/next");
    }

    #[tokio::test]
    async fn test_missing_challenge_makes_no_call() {
        let (server, flow) = setup().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        assert!(matches!(
            flow.pre_login(&FlowRequest::new()).await,
            Err(FlowError::MissingChallenge("login_challenge"))
        ));
        assert!(matches!(
            flow.request_consent(&login_request("lc")).await,
            Err(FlowError::MissingChallenge("consent_challenge"))
        ));
    }

    #[tokio::test]
    async fn test_zero_http_timeout_means_no_timeout() {
        let server = MockServer::start().await;
        let config = HydraConfig::new(server.uri()).with_http_timeout(0);
        let flow = HydraFlow::new(&config, Arc::new(StaticAccounts::new())).unwrap();

        Mock::given(method("GET"))
            .and(path(LOGIN))
            .and(query_param("login_challenge", "lc0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"skip": false})))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(flow.pre_login(&login_request("lc0")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported() {
        let (server, flow) = setup().await;

        Mock::given(method("GET"))
            .and(path(LOGIN))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let err = flow.pre_login(&login_request("gone")).await.unwrap_err();
        assert!(matches!(err, FlowError::Provider(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_request_consent_maps_scopes() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc1",
            json!({
                "challenge": "cc1",
                "skip": false,
                "subject": "1000",
                "client": {"client_id": "app-id", "client_name": ""},
                "requested_scope": ["openid", "profile", "email", "custom"],
                "requested_access_token_audience": []
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .respond_with(redirect_to("/never"))
            .expect(0)
            .mount(&server)
            .await;

        let info = flow.request_consent(&consent_request("cc1")).await.unwrap();
        assert_eq!(info.redirect, None);
        assert_eq!(info.target, "app-id");
        assert_eq!(
            info.scopes,
            vec![
                Scope {
                    name: "openid".into(),
                    description: String::new(),
                    hidden: true
                },
                Scope {
                    name: "profile".into(),
                    description: "Access your first and last name".into(),
                    hidden: false
                },
                Scope {
                    name: "email".into(),
                    description: "Access your email address".into(),
                    hidden: false
                },
                Scope {
                    name: "custom".into(),
                    description: "(no detailed description) access to 'custom'".into(),
                    hidden: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_request_consent_prefers_client_name() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc2",
            json!({
                "skip": false,
                "subject": "1000",
                "client": {"client_id": "app-id", "client_name": "Example App"},
                "requested_scope": ["openid"]
            }),
        )
        .await;

        let info = flow.request_consent(&consent_request("cc2")).await.unwrap();
        assert_eq!(info.target, "Example App");
    }

    #[tokio::test]
    async fn test_request_consent_without_client() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc3",
            json!({"skip": false, "subject": "1000", "requested_scope": ["openid"]}),
        )
        .await;

        assert!(matches!(
            flow.request_consent(&consent_request("cc3")).await,
            Err(FlowError::MissingClient)
        ));
    }

    #[tokio::test]
    async fn test_skip_consent_auto_accepts_with_claims() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc4",
            json!({
                "skip": true,
                "subject": "1000",
                "client": {"client_id": "app"},
                "requested_scope": ["openid", "profile"],
                "requested_access_token_audience": ["aud1"]
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .and(path(CONSENT_ACCEPT))
            .and(query_param("consent_challenge", "cc4"))
            .and(body_json(json!({
                "grant_scope": ["openid", "profile"],
                "grant_access_token_audience": ["aud1"],
                "remember": true,
                "remember_for": 3600,
                "session": {
                    "id_token": {
                        "given_name": "Jane",
                        "family_name": "Doe",
                        "preferred_username": "jdoe"
                    }
                }
            })))
            .respond_with(redirect_to("https://hydra/consented"))
            .expect(1)
            .mount(&server)
            .await;

        let info = flow.request_consent(&consent_request("cc4")).await.unwrap();
        assert_eq!(info, ConsentInfo::redirect("https://hydra/consented"));
    }

    #[tokio::test]
    async fn test_skip_consent_without_profile_has_no_session() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc5",
            json!({
                "skip": true,
                "subject": "1001",
                "requested_scope": ["openid", "email"],
                "requested_access_token_audience": []
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .and(path(CONSENT_ACCEPT))
            .and(body_json(json!({
                "grant_scope": ["openid", "email"],
                "grant_access_token_audience": [],
                "remember": true,
                "remember_for": 3600
            })))
            .respond_with(redirect_to("/ok"))
            .expect(1)
            .mount(&server)
            .await;

        let info = flow.request_consent(&consent_request("cc5")).await.unwrap();
        assert_eq!(info.redirect_target(), Some("/ok"));
    }

    #[tokio::test]
    async fn test_single_word_display_name_only_sets_username() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc6",
            json!({
                "skip": true,
                "subject": "1001",
                "requested_scope": ["profile"],
                "requested_access_token_audience": []
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .and(path(CONSENT_ACCEPT))
            .and(body_json(json!({
                "grant_scope": ["profile"],
                "grant_access_token_audience": [],
                "remember": true,
                "remember_for": 3600,
                "session": {"id_token": {"preferred_username": "prince"}}
            })))
            .respond_with(redirect_to("/ok"))
            .expect(1)
            .mount(&server)
            .await;

        flow.request_consent(&consent_request("cc6")).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_subject_fails_identity_lookup() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc7",
            json!({
                "skip": true,
                "subject": "4242",
                "requested_scope": ["profile"]
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .respond_with(redirect_to("/never"))
            .expect(0)
            .mount(&server)
            .await;

        assert!(matches!(
            flow.request_consent(&consent_request("cc7")).await,
            Err(FlowError::IdentityLookup(_))
        ));
    }

    #[tokio::test]
    async fn test_accept_grants_only_selected_scopes() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc8",
            json!({
                "skip": false,
                "subject": "1000",
                "client": {"client_id": "app"},
                "requested_scope": ["openid", "profile", "email"],
                "requested_access_token_audience": ["aud1"]
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .and(path(CONSENT_ACCEPT))
            .and(query_param("consent_challenge", "cc8"))
            .and(body_json(json!({
                "grant_scope": ["email"],
                "grant_access_token_audience": ["aud1"],
                "remember": true,
                "remember_for": 3600
            })))
            .respond_with(redirect_to("https://hydra/granted"))
            .expect(1)
            .mount(&server)
            .await;

        let request = consent_request("cc8")
            .with_form_pair("scope.email", "on")
            .with_form_pair("scope.profile", "off")
            .with_form_pair("consent", "Accept");
        let redirect = flow.accept_consent(&request).await.unwrap();
        assert_eq!(redirect, "https://hydra/granted");
    }

    #[tokio::test]
    async fn test_accept_with_profile_attaches_claims() {
        let (server, flow) = setup().await;

        mount_consent(
            &server,
            "cc9",
            json!({
                "skip": false,
                "subject": "1000",
                "client": {"client_id": "app"},
                "requested_scope": ["openid", "profile"],
                "requested_access_token_audience": []
            }),
        )
        .await;
        Mock::given(method("PUT"))
            .and(path(CONSENT_ACCEPT))
            .and(body_json(json!({
                "grant_scope": ["openid", "profile"],
                "grant_access_token_audience": [],
                "remember": true,
                "remember_for": 3600,
                "session": {
                    "id_token": {
                        "given_name": "Jane",
                        "family_name": "Doe",
                        "preferred_username": "jdoe"
                    }
                }
            })))
            .respond_with(redirect_to("/granted"))
            .expect(1)
            .mount(&server)
            .await;

        let request = FlowRequest::new()
            .with_query_pair("consent_challenge", "cc9")
            .with_form_body(b"scope.openid=on&scope.profile=on&consent=Accept");
        assert_eq!(flow.accept_consent(&request).await.unwrap(), "/granted");
    }

    #[tokio::test]
    async fn test_deny_rejects_and_never_accepts() {
        let (server, flow) = setup().await;

        Mock::given(method("PUT"))
            .and(path(CONSENT_REJECT))
            .and(query_param("consent_challenge", "cc10"))
            .and(body_json(json!({
                "error": "access_denied",
                "error_description": "The resource owner denied the request"
            })))
            .respond_with(redirect_to("https://hydra/denied"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CONSENT_ACCEPT))
            .respond_with(redirect_to("/never"))
            .expect(0)
            .mount(&server)
            .await;

        let request = consent_request("cc10")
            .with_form_pair("scope.email", "on")
            .with_form_pair("consent", "Deny");
        assert_eq!(
            flow.accept_consent(&request).await.unwrap(),
            "https://hydra/denied"
        );
    }

    #[tokio::test]
    async fn test_invalid_decisions_make_no_call() {
        let (server, flow) = setup().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let missing = consent_request("cc11").with_form_pair("scope.email", "on");
        let err = flow.accept_consent(&missing).await.unwrap_err();
        assert!(matches!(err, FlowError::MissingConsentDecision));
        assert_eq!(err.to_string(), "missing consent decision");

        let duplicate = consent_request("cc11")
            .with_form_pair("consent", "Accept")
            .with_form_pair("consent", "Deny");
        assert!(matches!(
            flow.accept_consent(&duplicate).await,
            Err(FlowError::MissingConsentDecision)
        ));

        let unknown = consent_request("cc11").with_form_pair("consent", "Maybe");
        let err = flow.accept_consent(&unknown).await.unwrap_err();
        assert!(matches!(err, FlowError::UnknownConsentDecision));
        assert_eq!(err.to_string(), "unknown consent decision");
    }

    #[tokio::test]
    async fn test_supports_oidc() {
        let (_server, flow) = setup().await;
        assert!(flow.supports_oidc());
    }
}
