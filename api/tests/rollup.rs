use serde_json::json;

use crate::common::run_app_test;

#[tokio::test]
async fn progress_is_truncated_mean_of_tasks() {
    run_app_test(|app| async move {
        let client_id = app.add_client("Acme", "owner@acme.com").await?;
        let project_id = app.add_project("Website", &client_id).await?;

        assert_eq!(app.project_progress(&project_id).await?, 0);

        app.add_task("one", &project_id, 50).await?;
        let task_b = app.add_task("two", &project_id, 51).await?;

        // (50 + 51) / 2 truncates down
        assert_eq!(app.project_progress(&project_id).await?, 50);

        let response = app
            .admin_user
            .client
            .put(&format!("tasks/{task_b}"))
            .json(&json!({
                "title": "two",
                "description": "two description",
                "status": "in_progress",
                "progress": 100,
                "project_id": project_id,
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);

        // (50 + 100) / 2
        assert_eq!(app.project_progress(&project_id).await?, 75);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn deleting_tasks_recomputes_progress() {
    run_app_test(|app| async move {
        let client_id = app.add_client("Acme", "owner@acme.com").await?;
        let project_id = app.add_project("Website", &client_id).await?;

        let task_a = app.add_task("one", &project_id, 100).await?;
        let task_b = app.add_task("two", &project_id, 20).await?;
        assert_eq!(app.project_progress(&project_id).await?, 60);

        let response = app
            .admin_user
            .client
            .delete(&format!("tasks/{task_b}"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(app.project_progress(&project_id).await?, 100);

        let response = app
            .admin_user
            .client
            .delete(&format!("tasks/{task_a}"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);

        // A project with no tasks reads as zero.
        assert_eq!(app.project_progress(&project_id).await?, 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn moving_a_task_recomputes_both_projects() {
    run_app_test(|app| async move {
        let client_id = app.add_client("Acme", "owner@acme.com").await?;
        let project_a = app.add_project("Website", &client_id).await?;
        let project_b = app.add_project("Mobile App", &client_id).await?;

        app.add_task("stays", &project_a, 10).await?;
        let mover = app.add_task("moves", &project_a, 90).await?;
        assert_eq!(app.project_progress(&project_a).await?, 50);
        assert_eq!(app.project_progress(&project_b).await?, 0);

        let response = app
            .admin_user
            .client
            .put(&format!("tasks/{mover}"))
            .json(&json!({
                "title": "moves",
                "description": "moves description",
                "status": "pending",
                "progress": 90,
                "project_id": project_b,
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);

        assert_eq!(app.project_progress(&project_a).await?, 10);
        assert_eq!(app.project_progress(&project_b).await?, 90);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn concurrent_task_creates_settle_to_the_mean() {
    run_app_test(|app| async move {
        let client_id = app.add_client("Acme", "owner@acme.com").await?;
        let project_id = app.add_project("Website", &client_id).await?;

        // Issue the creates in parallel. Each insert-plus-rollup locks the
        // project row, so whatever order they land in, the last one to commit
        // sees every task.
        let values = [10, 20, 30, 40, 50, 60, 70, 80];
        let creates = values.iter().map(|progress| {
            let app = &app;
            let project_id = project_id.clone();
            async move {
                let response = app
                    .admin_user
                    .client
                    .post("tasks")
                    .json(&json!({
                        "title": format!("task {progress}"),
                        "description": "concurrent",
                        "progress": progress,
                        "project_id": project_id,
                    }))
                    .send()
                    .await?;
                assert_eq!(response.status().as_u16(), 201);
                Ok::<_, anyhow::Error>(())
            }
        });
        futures::future::try_join_all(creates).await?;

        // floor(360 / 8)
        assert_eq!(app.project_progress(&project_id).await?, 45);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn stored_project_progress_is_ignored() {
    run_app_test(|app| async move {
        let client_id = app.add_client("Acme", "owner@acme.com").await?;
        let project_id = app.add_project("Website", &client_id).await?;
        app.add_task("one", &project_id, 40).await?;

        // progress in the request body is ignored; updates respond with the
        // recomputed rollup.
        let response = app
            .admin_user
            .client
            .put(&format!("projects/{project_id}"))
            .json(&json!({
                "name": "Website",
                "description": "Website description",
                "status": "in_development",
                "progress": 99,
                "client_id": client_id,
                "start_date": "2024-01-01",
                "due_date": "2024-12-31",
            }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["progress"], 40);

        assert_eq!(app.project_progress(&project_id).await?, 40);
        Ok(())
    })
    .await
}
