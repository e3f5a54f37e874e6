use common::storage::ObjectStore;
use serde_json::json;

use crate::common::{TestApp, routes};

mod extract {
    use super::*;

    #[tokio::test]
    async fn indexes_pdfs_under_artifact_prefix() {
        let app = TestApp::spawn().await;
        app.put_objects(&[
            "N-1/a.pdf",
            "N-1/notes.txt",
            "N-1/sub/b.pdf",
            "N-2/c.pdf",
        ])
        .await;
        app.create_node("N-1", "N-1/").await;

        let res = app.post(&routes::extract("N-1"), &json!({})).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["extracted_count"], 2);
        assert_eq!(res.filenames("files"), vec!["a.pdf", "b.pdf"]);
        assert_eq!(res.body["files"][1]["path"], "N-1/sub/b.pdf");

        let node = app.get(&routes::node("N-1")).await;
        assert_eq!(node.body["drawing_files"], res.body["files"]);
    }

    #[tokio::test]
    async fn repeated_extraction_is_stable() {
        let app = TestApp::spawn().await;
        app.put_objects(&["N-1/a.pdf", "N-1/b.pdf"]).await;
        app.create_node("N-1", "N-1/").await;

        let first = app.post(&routes::extract("N-1"), &json!({})).await;
        let second = app.post(&routes::extract("N-1"), &json!({})).await;

        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn clears_list_when_drawings_disappear() {
        let app = TestApp::spawn().await;
        app.put_objects(&["N-1/a.pdf"]).await;
        app.create_node("N-1", "N-1/").await;
        app.post(&routes::extract("N-1"), &json!({})).await;

        app.files.remove("N-1/a.pdf").await.unwrap();
        let res = app.post(&routes::extract("N-1"), &json!({})).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["extracted_count"], 0);
        let node = app.get(&routes::node("N-1")).await;
        assert_eq!(node.body["drawing_files"], json!([]));
    }

    #[tokio::test]
    async fn unknown_node_is_404() {
        let app = TestApp::spawn().await;

        let res = app.post(&routes::extract("ghost"), &json!({})).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod reconcile {
    use super::*;

    #[tokio::test]
    async fn summarizes_nodes_with_drawings() {
        let app = TestApp::spawn().await;
        app.put_objects(&["A/one.pdf", "A/two.pdf", "B/three.pdf", "C/readme.txt"])
            .await;
        for id in ["A", "B", "C"] {
            app.create_node(id, &format!("archive/{id}.pdf")).await;
        }

        let res = app.post(routes::RECONCILE, &json!({})).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["scanned_nodes"], 3);
        assert_eq!(res.body["processed_nodes"], 2);
        assert_eq!(res.body["total_files"], 3);
        assert_eq!(
            res.body["details"],
            json!([
                {"node_id": "A", "file_count": 2},
                {"node_id": "B", "file_count": 1},
            ])
        );
        assert_eq!(res.body["failures"], json!([]));

        let a = app.get(&routes::node("A")).await;
        assert_eq!(a.filenames("drawing_files"), vec!["one.pdf", "two.pdf"]);
    }

    #[tokio::test]
    async fn leaves_nodes_without_drawings_untouched() {
        let app = TestApp::spawn().await;
        app.put_objects(&["C/keep.pdf"]).await;
        // Extraction scans `pdf_url`, so this fills C's list from "C/".
        app.create_node("C", "C/").await;
        app.post(&routes::extract("C"), &json!({})).await;
        // Reconciliation scans the node ID, which now finds nothing.
        app.files.put("moved/keep.pdf", b"%PDF").await.unwrap();
        app.files.remove("C/keep.pdf").await.unwrap();

        let res = app.post(routes::RECONCILE, &json!({})).await;

        assert_eq!(res.body["processed_nodes"], 0);
        let c = app.get(&routes::node("C")).await;
        assert_eq!(c.filenames("drawing_files"), vec!["keep.pdf"]);
    }

    #[tokio::test]
    async fn invalid_node_prefix_is_reported_not_fatal() {
        let app = TestApp::spawn().await;
        app.put_objects(&["A/one.pdf", "Z/two.pdf"]).await;
        app.create_node("A", "archive/A.pdf").await;
        // A leading slash is not a valid filesystem prefix.
        app.create_node("/abs", "archive/abs.pdf").await;
        app.create_node("Z", "archive/Z.pdf").await;

        let res = app.post(routes::RECONCILE, &json!({})).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["scanned_nodes"], 3);
        assert_eq!(res.body["processed_nodes"], 2);
        assert_eq!(res.body["failures"][0]["node_id"], "/abs");
        assert_eq!(res.body["failures"][0]["stage"], "list");
    }

    #[tokio::test]
    async fn empty_catalog_reports_zero() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::RECONCILE, &json!({})).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["scanned_nodes"], 0);
        assert_eq!(res.body["details"], json!([]));
    }
}
