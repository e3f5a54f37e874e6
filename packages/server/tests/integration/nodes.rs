use serde_json::json;

use crate::common::{TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn returns_201_with_empty_drawings() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::NODES,
                &json!({"id": "N-1", "name": "Bracket", "pdf_url": "N-1/main.pdf"}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["id"], "N-1");
        assert_eq!(res.body["pdf_url"], "N-1/main.pdf");
        assert_eq!(res.body["drawing_files"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_id_is_conflict() {
        let app = TestApp::spawn().await;
        app.create_node("N-1", "N-1/main.pdf").await;

        let res = app
            .post(
                routes::NODES,
                &json!({"id": "N-1", "name": "Again", "pdf_url": "N-1/other.pdf"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn blank_id_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::NODES, &json!({"id": "  ", "name": "X", "pdf_url": "x.pdf"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_pdf_url_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::NODES, &json!({"id": "N-1", "name": "X", "pdf_url": " "}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.get(&routes::node("N-1")).await.status, 404);
    }

    #[tokio::test]
    async fn malformed_json_is_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::NODES, &json!({"id": 5})).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn list_returns_nodes_in_creation_order() {
        let app = TestApp::spawn().await;
        app.create_node("B", "B/main.pdf").await;
        app.create_node("A", "A/main.pdf").await;

        let res = app.get(routes::NODES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"], 2);
        assert_eq!(res.body["nodes"][0]["id"], "B");
        assert_eq!(res.body["nodes"][1]["id"], "A");
    }

    #[tokio::test]
    async fn get_missing_node_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::node("nope")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_primary_pdf_and_row() {
        let app = TestApp::spawn().await;
        app.put_objects(&["N-1/main.pdf", "N-1/sheet-2.pdf"]).await;
        app.create_node("N-1", "N-1/main.pdf").await;

        let res = app.delete(&routes::node("N-1")).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["artifact_removed"], true);
        assert!(res.body["artifact_error"].is_null());
        assert_eq!(app.get(&routes::node("N-1")).await.status, 404);
        // Only the primary artifact is removed.
        assert!(app.files.open("N-1/main.pdf").await.is_err());
        assert!(app.files.open("N-1/sheet-2.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn unusable_artifact_key_does_not_block_delete() {
        let app = TestApp::spawn().await;
        app.create_node("N-1", "../escape.pdf").await;

        let res = app.delete(&routes::node("N-1")).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["artifact_removed"], false);
        assert!(res.body["artifact_error"].is_string());
        assert_eq!(app.get(&routes::node("N-1")).await.status, 404);
    }

    #[tokio::test]
    async fn missing_node_is_404() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::node("nope")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
