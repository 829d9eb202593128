/// Client tests against a mock `/api` endpoint.
#[cfg(test)]
mod unit {
    use crate::AssetClient;
    use action_core::config::ClientConfig;
    use action_core::{AssetDirectory, AssetVersionRef, RemoteOperationError};
    use mockito::{Matcher, Mock, ServerGuard};
    use tempfile::TempDir;

    fn config(server: &ServerGuard) -> ClientConfig {
        ClientConfig {
            server_url: format!("{}/", server.url()),
            api_user: "pipeline".into(),
            api_key: "secret".into(),
            timeout_secs: 5,
        }
    }

    fn mock_handshake(server: &mut ServerGuard) -> (Mock, Mock) {
        let info = server
            .mock("POST", "/api")
            .match_header("ftrack-user", "pipeline")
            .match_header("ftrack-api-key", "secret")
            .match_body(Matcher::Regex(r#""action":"query_server_information""#.into()))
            .with_header("content-type", "application/json")
            .with_body(r#"[{"version": "4.13.2", "schema_hash": "abc"}]"#)
            .create();
        let location = server
            .mock("POST", "/api")
            .match_body(Matcher::Regex("ftrack.unmanaged".into()))
            .with_header("content-type", "application/json")
            .with_body(r#"[{"action": "query", "data": [{"id": "loc-1", "__entity_type__": "Location"}]}]"#)
            .create();
        (info, location)
    }

    fn connected(server: &mut ServerGuard) -> AssetClient {
        let (_info, _location) = mock_handshake(server);
        AssetClient::connect(&config(server)).expect("connect")
    }

    #[test]
    fn connect_reads_server_info_and_location() {
        let mut server = mockito::Server::new();
        let (info, location) = mock_handshake(&mut server);

        let client = AssetClient::connect(&config(&server)).unwrap();
        assert_eq!(client.server_version(), Some("4.13.2"));
        assert_eq!(client.location_id(), "loc-1");
        info.assert();
        location.assert();
    }

    #[test]
    fn connect_with_bad_credentials_is_unauthorized() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/api")
            .with_status(401)
            .with_body("The supplied API key is not valid.")
            .create();

        let err = AssetClient::connect(&config(&server)).unwrap_err();
        assert!(matches!(err, RemoteOperationError::Unauthorized(_)));
    }

    #[test]
    fn connect_without_unmanaged_location_fails() {
        let mut server = mockito::Server::new();
        let _info = server
            .mock("POST", "/api")
            .match_body(Matcher::Regex("query_server_information".into()))
            .with_body(r#"[{"version": "4.13.2"}]"#)
            .create();
        let _loc = server
            .mock("POST", "/api")
            .match_body(Matcher::Regex("ftrack.unmanaged".into()))
            .with_body(r#"[{"action": "query", "data": []}]"#)
            .create();

        let err = AssetClient::connect(&config(&server)).unwrap_err();
        assert!(matches!(err, RemoteOperationError::Decode(ref m) if m.contains("ftrack.unmanaged")));
    }

    #[test]
    fn connect_to_unreachable_server_is_transport_error() {
        let cfg = ClientConfig {
            server_url: "http://127.0.0.1:1".into(),
            api_user: "pipeline".into(),
            api_key: "secret".into(),
            timeout_secs: 2,
        };
        assert!(matches!(
            AssetClient::connect(&cfg),
            Err(RemoteOperationError::Transport(_))
        ));
    }

    #[test]
    fn create_component_sends_component_and_location() {
        let mut server = mockito::Server::new();
        let client = connected(&mut server);

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("geo.abc");
        std::fs::write(&file, b"0123456789").unwrap();

        let create = server
            .mock("POST", "/api")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""entity_type":"FileComponent""#.into()),
                Matcher::Regex(r#""entity_type":"ComponentLocation""#.into()),
                Matcher::Regex(r#""version_id":"v1""#.into()),
                Matcher::Regex(r#""file_type":".abc""#.into()),
                Matcher::Regex(r#""location_id":"loc-1""#.into()),
                Matcher::Regex(r#""size":10"#.into()),
            ]))
            .with_body(r#"[{"action": "create", "data": {"id": "comp-1"}}, {"action": "create", "data": {}}]"#)
            .create();

        let component = client
            .create_component(&AssetVersionRef::new("v1"), "geo", &file)
            .unwrap();
        assert_eq!(component.id, "comp-1");
        assert_eq!(component.name, "geo");
        create.assert();
    }

    #[test]
    fn duplicate_component_is_component_exists() {
        let mut server = mockito::Server::new();
        let client = connected(&mut server);
        let dir = TempDir::new().unwrap();

        let _m = server
            .mock("POST", "/api")
            .match_body(Matcher::Regex("FileComponent".into()))
            .with_status(500)
            .with_body(r#"{"exception": "ServerError", "content": "Duplicate entry 'geo' for key 'version_id_name'"}"#)
            .create();

        let err = client
            .create_component(&AssetVersionRef::new("v1"), "geo", dir.path())
            .unwrap_err();
        assert_eq!(
            err,
            RemoteOperationError::ComponentExists {
                name: "geo".into(),
                version_id: "v1".into()
            }
        );
    }

    #[test]
    fn short_result_list_is_decode_error() {
        let mut server = mockito::Server::new();
        let client = connected(&mut server);
        let dir = TempDir::new().unwrap();

        let _m = server
            .mock("POST", "/api")
            .match_body(Matcher::Regex("FileComponent".into()))
            .with_body(r#"[{"action": "create", "data": {"id": "comp-1"}}]"#)
            .create();

        let err = client
            .create_component(&AssetVersionRef::new("v1"), "geo", dir.path())
            .unwrap_err();
        assert!(matches!(err, RemoteOperationError::Decode(_)));
    }

    #[test]
    fn publish_updates_version() {
        let mut server = mockito::Server::new();
        let client = connected(&mut server);

        let publish = server
            .mock("POST", "/api")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""action":"update""#.into()),
                Matcher::Regex(r#""entity_key":\["v1"\]"#.into()),
                Matcher::Regex(r#""is_published":true"#.into()),
            ]))
            .with_body(r#"[{"action": "update", "data": {"id": "v1", "is_published": true}}]"#)
            .create();

        client.publish(&AssetVersionRef::new("v1")).unwrap();
        publish.assert();
    }

    #[test]
    fn publish_missing_version_is_version_not_found() {
        let mut server = mockito::Server::new();
        let client = connected(&mut server);

        let _m = server
            .mock("POST", "/api")
            .match_body(Matcher::Regex(r#""action":"update""#.into()))
            .with_body(r#"{"exception": "NoResultFoundError", "content": "No result found for AssetVersion v404"}"#)
            .create();

        let err = client.publish(&AssetVersionRef::new("v404")).unwrap_err();
        assert_eq!(err, RemoteOperationError::VersionNotFound("v404".into()));
    }
}
