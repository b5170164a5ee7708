mod integration_tests {
    use crate::handlers::cars::CreateCarRequest;
    use crate::handlers::manufacturers::{CreateManufacturerRequest, UpdateManufacturerRequest};
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::{seed_cars, seed_drivers, seed_manufacturers, setup_test_app};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use model::store;
    use serde_json::json;

    async fn test_server() -> (TestServer, crate::schemas::AppState) {
        let (app, state) = setup_test_app().await;
        (TestServer::new(app).unwrap(), state)
    }

    fn valid_driver_form() -> Vec<(&'static str, &'static str)> {
        vec![
            ("username", "new_user"),
            ("password1", "user12test"),
            ("password2", "user12test"),
            ("first_name", "Test first"),
            ("last_name", "Test last"),
            ("license_number", "AAA55555"),
        ]
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _) = test_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_index_shows_counts() {
        let (server, state) = test_server().await;
        seed_cars(&state.db).await;
        seed_drivers(&state.db).await;

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains(r#"<span id="num-manufacturers">3</span>"#));
        assert!(text.contains(r#"<span id="num-cars">3</span>"#));
        assert!(text.contains(r#"<span id="num-drivers">3</span>"#));
    }

    // ===================== Search on list pages =====================

    #[tokio::test]
    async fn test_search_manufacturers_by_name() {
        let (server, state) = test_server().await;
        seed_manufacturers(&state.db).await;

        let response = server
            .get("/manufacturers/")
            .add_query_param("name", "Tes")
            .await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("Tesla"));
        assert!(!text.contains("Toyota"));
        assert!(!text.contains("Ford"));
        assert!(text.contains(r#"value="Tes""#));
    }

    #[tokio::test]
    async fn test_manufacturer_list_without_query_shows_all() {
        let (server, state) = test_server().await;
        seed_manufacturers(&state.db).await;

        let response = server.get("/manufacturers/").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        for name in ["Toyota", "Ford", "Tesla"] {
            assert!(text.contains(name), "missing {}", name);
        }
        // Listed by name
        let ford = text.find("Ford").unwrap();
        let tesla = text.find("Tesla").unwrap();
        let toyota = text.find("Toyota").unwrap();
        assert!(ford < tesla && tesla < toyota);
    }

    #[tokio::test]
    async fn test_search_drivers_by_username() {
        let (server, state) = test_server().await;
        seed_drivers(&state.db).await;

        let response = server
            .get("/drivers/")
            .add_query_param("username", "ver2")
            .await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("Driver2"));
        assert!(!text.contains("Driver1"));
        assert!(!text.contains("Driver3"));
    }

    #[tokio::test]
    async fn test_search_cars_without_match() {
        let (server, state) = test_server().await;
        seed_cars(&state.db).await;

        let response = server
            .get("/cars/")
            .add_query_param("model", "Corolla")
            .await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(!text.contains("Camry"));
        assert!(!text.contains("F150"));
        assert!(!text.contains("Model S"));
    }

    #[tokio::test]
    async fn test_search_cars_is_case_insensitive() {
        let (server, state) = test_server().await;
        seed_cars(&state.db).await;

        let response = server.get("/cars/").add_query_param("model", "f1").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("F150"));
        assert!(text.contains("Ford USA"));
        assert!(!text.contains("Camry"));
    }

    #[tokio::test]
    async fn test_search_treats_pattern_characters_literally() {
        let (server, state) = test_server().await;
        seed_cars(&state.db).await;

        let response = server.get("/cars/").add_query_param("model", ".*").await;

        response.assert_status(StatusCode::OK);
        assert!(!response.text().contains("Camry"));
    }

    #[tokio::test]
    async fn test_search_box_echoes_query_without_listing_records() {
        let (server, state) = test_server().await;
        let drivers = seed_drivers(&state.db).await;

        let response = server
            .get("/drivers/")
            .add_query_param("username", "Driver1x")
            .await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains(r#"value="Driver1x""#));
        assert!(text.contains("There are no drivers in the service"));
        for driver in &drivers {
            assert!(!text.contains(&driver.absolute_url()));
            assert!(!text.contains(&format!(">{}<", driver.username())));
        }
    }

    #[tokio::test]
    async fn test_car_list_renders_slash_verbatim() {
        let (server, state) = test_server().await;
        let manufacturers = seed_manufacturers(&state.db).await;
        store::create_car(
            &state.db,
            store::NewCar {
                model: "CX-5/Sport".to_string(),
                manufacturer_id: manufacturers[0].id,
            },
        )
        .await
        .unwrap();

        let response = server.get("/cars/").add_query_param("model", "cx-5").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("CX-5/Sport"));
        assert!(!text.contains("&#x2F;"));
    }

    // ===================== Detail pages =====================

    #[tokio::test]
    async fn test_car_detail_lists_assigned_drivers() {
        let (server, state) = test_server().await;
        let cars = seed_cars(&state.db).await;
        let drivers = seed_drivers(&state.db).await;
        store::assign_driver(&state.db, cars[0].car.id, drivers[1].id())
            .await
            .unwrap();

        let response = server.get(&format!("/cars/{}/", cars[0].car.id)).await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("Camry"));
        assert!(text.contains("Toyota Japan"));
        assert!(text.contains("Driver2"));
        assert!(!text.contains("Driver1"));
    }

    #[tokio::test]
    async fn test_driver_detail_is_the_canonical_url() {
        let (server, state) = test_server().await;
        let cars = seed_cars(&state.db).await;
        let drivers = seed_drivers(&state.db).await;
        store::assign_driver(&state.db, cars[1].car.id, drivers[0].id())
            .await
            .unwrap();

        let response = server.get(&drivers[0].absolute_url()).await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("Driver1"));
        assert!(text.contains("LIC00001"));
        assert!(text.contains("F150"));
    }

    #[tokio::test]
    async fn test_unknown_records_render_not_found() {
        let (server, _) = test_server().await;

        server.get("/cars/999/").await.assert_status(StatusCode::NOT_FOUND);
        server.get("/drivers/999/").await.assert_status(StatusCode::NOT_FOUND);
        server
            .get("/drivers/999/update/")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/no/such/page/")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_license_update_form() {
        let (server, state) = test_server().await;
        let drivers = seed_drivers(&state.db).await;
        let path = format!("/drivers/{}/update/", drivers[0].id());

        let response = server.get(&path).await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains(r#"value="LIC00001""#));

        let response = server
            .post(&path)
            .form(&[("license_number", "bad")])
            .await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("3 uppercase letters followed by 5 digits"));

        let response = server
            .post(&path)
            .form(&[("license_number", "QWE12345")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("location").to_str().unwrap(),
            drivers[0].absolute_url()
        );

        let updated = store::get_driver(&state.db, drivers[0].id()).await.unwrap();
        assert_eq!(updated.license_number, "QWE12345");
    }

    // ===================== Admin pages =====================

    #[tokio::test]
    async fn test_driver_license_listed() {
        let (server, state) = test_server().await;
        let drivers = seed_drivers(&state.db).await;

        let response = server.get("/admin/taxi/driver/").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        for driver in &drivers {
            assert!(text.contains(&driver.license_number));
        }
    }

    #[tokio::test]
    async fn test_driver_license_with_slash_listed_verbatim() {
        let (server, state) = test_server().await;
        let driver = store::create_driver(
            &state.db,
            store::NewDriver::new("slashed")
                .password("testpass123")
                .names("Slash", "Driver")
                .license_number("AB/123"),
        )
        .await
        .unwrap();

        let changelist = server.get("/admin/taxi/driver/").await;
        changelist.assert_status(StatusCode::OK);
        assert!(changelist.text().contains("AB/123"));

        let change = server
            .get(&format!("/admin/taxi/driver/{}/change/", driver.id()))
            .await;
        change.assert_status(StatusCode::OK);
        assert!(change.text().contains("AB/123"));
    }

    #[tokio::test]
    async fn test_driver_detailed_license_listed() {
        let (server, state) = test_server().await;
        let admin = store::create_superuser(
            &state.db,
            store::NewDriver::new("admin").password("testadmin"),
        )
        .await
        .unwrap();
        let driver = store::create_driver(
            &state.db,
            store::NewDriver::new("driver")
                .password("testdriver")
                .license_number("Test License"),
        )
        .await
        .unwrap();

        let response = server
            .get(&format!("/admin/taxi/driver/{}/change/", driver.id()))
            .await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("Test License"));

        let response = server
            .get(&format!("/admin/taxi/driver/{}/change/", admin.id()))
            .await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("Superuser status: true"));
    }

    #[tokio::test]
    async fn test_driver_change_page_unknown_id() {
        let (server, _) = test_server().await;

        let response = server.get("/admin/taxi/driver/999/change/").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_driver_add_fieldsets() {
        let (server, _) = test_server().await;

        let response = server.get("/admin/taxi/driver/add/").await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains(r#"name="license_number""#));
        assert!(text.contains(r#"name="password1""#));
        assert!(text.contains(r#"name="password2""#));
    }

    #[tokio::test]
    async fn test_driver_add_creates_driver_and_redirects() {
        let (server, state) = test_server().await;

        let response = server
            .post("/admin/taxi/driver/add/")
            .form(&valid_driver_form())
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let drivers = store::list_drivers(&state.db).await.unwrap();
        assert_eq!(drivers.len(), 1);
        let driver = &drivers[0];
        assert_eq!(driver.username(), "new_user");
        assert_eq!(driver.license_number, "AAA55555");
        assert!(driver.check_password("user12test"));
        assert_ne!(driver.account.password, "user12test");
        assert_eq!(
            response.header("location").to_str().unwrap(),
            format!("/admin/taxi/driver/{}/change/", driver.id())
        );
    }

    #[tokio::test]
    async fn test_driver_add_rerenders_with_errors() {
        let (server, state) = test_server().await;
        let mut form = valid_driver_form();
        form[2] = ("password2", "user12tesu");
        form[5] = ("license_number", "AA555555");

        let response = server.post("/admin/taxi/driver/add/").form(&form).await;

        response.assert_status(StatusCode::OK);
        let text = response.text();
        assert!(text.contains("The two password fields didn&#x27;t match."));
        assert!(text.contains("3 uppercase letters followed by 5 digits"));
        assert!(text.contains(r#"value="new_user""#));
        assert!(!text.contains("user12test"));
        assert!(store::list_drivers(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_driver_add_duplicate_username() {
        let (server, state) = test_server().await;
        seed_drivers(&state.db).await;
        let mut form = valid_driver_form();
        form[0] = ("username", "Driver1");

        let response = server.post("/admin/taxi/driver/add/").form(&form).await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("A user with that username already exists."));
        assert_eq!(store::list_drivers(&state.db).await.unwrap().len(), 3);
    }

    // ===================== JSON API =====================

    #[tokio::test]
    async fn test_manufacturer_crud() {
        let (server, _) = test_server().await;

        let response = server
            .post("/api/v1/manufacturers")
            .json(&CreateManufacturerRequest {
                name: "Lada".to_string(),
                country: "Russia".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "Manufacturer created successfully");
        let id = body.data["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/v1/manufacturers/{}", id))
            .json(&UpdateManufacturerRequest {
                name: Some("AvtoVAZ".to_string()),
                country: None,
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["name"], "AvtoVAZ");
        assert_eq!(body.data["country"], "Russia");

        let response = server.get(&format!("/api/v1/manufacturers/{}", id)).await;
        response.assert_status(StatusCode::OK);

        let response = server.delete(&format!("/api/v1/manufacturers/{}", id)).await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/v1/manufacturers/{}", id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "MANUFACTURER_NOT_FOUND");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_manufacturer_requires_name() {
        let (server, _) = test_server().await;

        let response = server
            .post("/api/v1/manufacturers")
            .json(&json!({"name": "", "country": "Japan"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_referenced_manufacturer_delete_conflict() {
        let (server, state) = test_server().await;
        let cars = seed_cars(&state.db).await;

        let response = server
            .delete(&format!("/api/v1/manufacturers/{}", cars[0].manufacturer.id))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "MANUFACTURER_IN_USE");
    }

    #[tokio::test]
    async fn test_manufacturer_list_filter_and_pagination() {
        let (server, state) = test_server().await;
        seed_manufacturers(&state.db).await;

        let response = server
            .get("/api/v1/manufacturers")
            .add_query_param("name", "T")
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        let names: Vec<&str> = body.data.iter().map(|m| m["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Tesla", "Toyota"]);

        let response = server
            .get("/api/v1/manufacturers")
            .add_query_param("name", "T")
            .add_query_param("page", "2")
            .add_query_param("limit", "1")
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["name"], "Toyota");

        let response = server
            .get("/api/v1/manufacturers")
            .add_query_param("page", "0")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/v1/manufacturers")
            .add_query_param("limit", "1001")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_car_with_unknown_manufacturer() {
        let (server, _) = test_server().await;

        let response = server
            .post("/api/v1/cars")
            .json(&CreateCarRequest {
                model: "Ghost".to_string(),
                manufacturer_id: 999,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_car_crud_and_driver_assignment() {
        let (server, state) = test_server().await;
        let manufacturers = seed_manufacturers(&state.db).await;
        let drivers = seed_drivers(&state.db).await;

        let response = server
            .post("/api/v1/cars")
            .json(&CreateCarRequest {
                model: "Prius".to_string(),
                manufacturer_id: manufacturers[0].id,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["manufacturer"], "Toyota Japan");
        let car_id = body.data["id"].as_i64().unwrap();

        let response = server
            .post(&format!("/api/v1/cars/{}/drivers/{}", car_id, drivers[2].id()))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["driver_ids"], json!([drivers[2].id()]));

        let response = server
            .get("/api/v1/cars")
            .add_query_param("model", "pri")
            .await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["model"], "Prius");

        let response = server
            .put(&format!("/api/v1/cars/{}", car_id))
            .json(&json!({"manufacturer_id": manufacturers[1].id}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["manufacturer"], "Ford USA");

        let response = server
            .delete(&format!("/api/v1/cars/{}/drivers/{}", car_id, drivers[2].id()))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["driver_ids"], json!([]));

        let response = server
            .post(&format!("/api/v1/cars/{}/drivers/999", car_id))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "DRIVER_NOT_FOUND");

        server
            .delete(&format!("/api/v1/cars/{}", car_id))
            .await
            .assert_status(StatusCode::OK);
        let response = server.get(&format!("/api/v1/cars/{}", car_id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "CAR_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_driver_via_api() {
        let (server, state) = test_server().await;
        let form = json!({
            "username": "new_user",
            "password1": "user12test",
            "password2": "user12test",
            "first_name": "Test first",
            "last_name": "Test last",
            "license_number": "AAA55555",
        });

        let response = server.post("/api/v1/drivers").json(&form).await;
        if response.status_code() != StatusCode::CREATED {
            panic!("Expected 201 Created, got {}: {}", response.status_code(), response.text());
        }
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["username"], "new_user");
        assert_eq!(body.data["license_number"], "AAA55555");
        assert!(body.data.get("password").is_none());
        let id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["url"], format!("/drivers/{}/", id));

        let driver = store::get_driver(&state.db, id as i32).await.unwrap();
        assert!(driver.check_password("user12test"));

        let response = server.post("/api/v1/drivers").json(&form).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "USERNAME_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_create_driver_validation_errors() {
        let (server, _) = test_server().await;

        let response = server
            .post("/api/v1/drivers")
            .json(&json!({
                "username": "new_user",
                "password1": "user12test",
                "password2": "user12tesu",
                "first_name": "Test first",
                "last_name": "Test last",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert!(body.error.contains("password2"));
        assert!(body.error.contains("license_number: This field is required."));
    }

    #[tokio::test]
    async fn test_driver_api_list_update_delete() {
        let (server, state) = test_server().await;
        let drivers = seed_drivers(&state.db).await;

        let response = server
            .get("/api/v1/drivers")
            .add_query_param("username", "DRIVER3")
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["username"], "Driver3");

        let response = server
            .put(&format!("/api/v1/drivers/{}/license", drivers[2].id()))
            .json(&json!({"license_number": "ZZZ99999"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["license_number"], "ZZZ99999");

        let response = server
            .put(&format!("/api/v1/drivers/{}/license", drivers[2].id()))
            .json(&json!({"license_number": "zzz99999"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        server
            .delete(&format!("/api/v1/drivers/{}", drivers[2].id()))
            .await
            .assert_status(StatusCode::OK);
        let response = server
            .get(&format!("/api/v1/drivers/{}", drivers[2].id()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "DRIVER_NOT_FOUND");
    }
}
