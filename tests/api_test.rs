// tests/api_test.rs

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mobtax::{
    config::{AppState, Config},
    db::SqliteStorage,
    routes,
};

struct TestApp {
    base: String,
    client: Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let storage = SqliteStorage::connect("sqlite::memory:").await.unwrap();
        let state = AppState::build(Config::local("segredo-de-teste"), Arc::new(storage))
            .await
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, routes::app(state)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    async fn token(&self, username: &str, password: &str) -> String {
        let body: Value = self.login(username, password).await.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap()
    }

    async fn send(&self, method: reqwest::Method, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn create(&self, token: &str, path: &str, body: Value) -> Value {
        let res = self.send(reqwest::Method::POST, token, path, body).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::spawn().await;
    let res = app.client.get(app.url("/api/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn superuser_login_has_every_module_at_edit() {
    let app = TestApp::spawn().await;

    let res = app.login("Admin", "@Vant96").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");
    for module in ["inicio", "financeiro", "cargas", "parceiros", "usuarios"] {
        assert_eq!(body["user"]["permissions"][module], "edit");
    }

    // Token do superusuário acessa rotas protegidas
    let token = body["token"].as_str().unwrap();
    let me: Value = app.get(token, "/api/users/me").await.json().await.unwrap();
    assert_eq!(me["username"], "Admin");
}

#[tokio::test]
async fn wrong_password_and_missing_token_are_unauthorized() {
    let app = TestApp::spawn().await;

    assert_eq!(app.login("admin", "errada").await.status(), StatusCode::UNAUTHORIZED);

    let res = app.client.get(app.url("/api/partners")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.get("token-invalido", "/api/cargoes").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_is_restored_after_login_and_cleared_by_logout() {
    let app = TestApp::spawn().await;

    let session = app.client.get(app.url("/api/auth/session")).send().await.unwrap();
    assert_eq!(session.status(), StatusCode::NOT_FOUND);

    let token = app.token("master", "master123").await;
    let session: Value = app
        .client
        .get(app.url("/api/auth/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["user"]["username"], "master");

    let res = app.send(reqwest::Method::POST, &token, "/api/auth/logout", json!({})).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let session = app.client.get(app.url("/api/auth/session")).send().await.unwrap();
    assert_eq!(session.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crt_longer_than_ten_characters_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let before: Vec<Value> = app.get(&token, "/api/cargoes").await.json().await.unwrap();

    let res = app
        .send(reqwest::Method::POST, &token, "/api/cargoes", json!({ "crt": "ABCDEFGHIJK" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["details"].get("crt").is_some());

    let after: Vec<Value> = app.get(&token, "/api/cargoes").await.json().await.unwrap();
    assert_eq!(before.len(), after.len());

    let created = app.create(&token, "/api/cargoes", json!({})).await;
    assert_eq!(created["descricao"], "Carga sem descrição");
    assert_eq!(created["status"], "a_coletar");
}

#[tokio::test]
async fn pf_partner_marked_as_driver_is_a_candidate() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let partner = app
        .create(
            &token,
            "/api/partners",
            json!({ "tipo": "PF", "nome": "Ana Souza", "isMotorista": true, "cnh": "12345678900" }),
        )
        .await;
    let partner_id = id_of(&partner);

    let candidates: Vec<Value> = app
        .get(&token, &format!("/api/partners/driver-candidates?parceiroId={}", partner_id))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["referencia"], json!({ "tipo": "parceiro", "id": partner_id }));
    assert_eq!(candidates[0]["nome"], "Ana Souza");

    // PJ não pode ser motorista
    let res = app
        .send(
            reqwest::Method::POST,
            &token,
            "/api/partners",
            json!({ "tipo": "PJ", "nome": "Empresa X", "isMotorista": true }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_partner_cascades_to_drivers_and_vehicles() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let partner = app
        .create(&token, "/api/partners", json!({ "tipo": "PJ", "nome": "Frota Sul" }))
        .await;
    let partner_id = id_of(&partner);

    let driver = app
        .create(&token, &format!("/api/partners/{}/drivers", partner_id), json!({ "nome": "Pedro" }))
        .await;
    let vehicle = app
        .create(
            &token,
            &format!("/api/partners/{}/vehicles", partner_id),
            json!({ "tipo": "Truck", "placa": "SUL1A23" }),
        )
        .await;

    let cargo = app
        .create(&token, "/api/cargoes", json!({ "crt": "SUL0001" }))
        .await;
    let res = app
        .send(
            reqwest::Method::PUT,
            &token,
            &format!("/api/cargoes/{}/link", id_of(&cargo)),
            json!({
                "parceiroId": partner_id,
                "motorista": { "tipo": "motorista", "id": id_of(&driver) },
                "veiculoId": id_of(&vehicle)
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .send(reqwest::Method::DELETE, &token, &format!("/api/partners/{}", partner_id), json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.get(&token, &format!("/api/drivers/{}", id_of(&driver))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = app.get(&token, &format!("/api/vehicles/{}", id_of(&vehicle))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // A carga continua, mas sem referências pendentes
    let cargo: Value = app
        .get(&token, &format!("/api/cargoes/{}", id_of(&cargo)))
        .await
        .json()
        .await
        .unwrap();
    assert!(cargo["parceiroId"].is_null());
    assert!(cargo["motoristaId"].is_null());
    assert!(cargo["veiculoId"].is_null());
}

#[tokio::test]
async fn relinking_a_vehicle_moves_it_between_drivers() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let partner = app
        .create(&token, "/api/partners", json!({ "tipo": "PJ", "nome": "Rota Norte" }))
        .await;
    let partner_id = id_of(&partner);
    let drivers_path = format!("/api/partners/{}/drivers", partner_id);

    let d1 = id_of(&app.create(&token, &drivers_path, json!({ "nome": "Primeiro" })).await);
    let d2 = id_of(&app.create(&token, &drivers_path, json!({ "nome": "Segundo" })).await);
    let v = id_of(
        &app.create(
            &token,
            &format!("/api/partners/{}/vehicles", partner_id),
            json!({ "tipo": "Conjunto", "placaCavalo": "NOR1A00", "placasCarreta": ["NOR2B00"] }),
        )
        .await,
    );

    let res = app
        .send(
            reqwest::Method::POST,
            &token,
            "/api/partners/links",
            json!({ "kind": "motorista", "sourceId": d1, "targetId": v }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app
        .send(
            reqwest::Method::POST,
            &token,
            "/api/partners/links",
            json!({ "kind": "veiculo", "sourceId": v, "targetId": d2 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let first: Value = app.get(&token, &format!("/api/drivers/{}", d1)).await.json().await.unwrap();
    let second: Value = app.get(&token, &format!("/api/drivers/{}", d2)).await.json().await.unwrap();
    let vehicle: Value = app.get(&token, &format!("/api/vehicles/{}", v)).await.json().await.unwrap();
    assert!(first["veiculoVinculado"].is_null());
    assert_eq!(second["veiculoVinculado"], v.as_str());
    assert_eq!(vehicle["motoristaVinculado"], json!({ "tipo": "motorista", "id": d2 }));

    let res = app
        .send(
            reqwest::Method::DELETE,
            &token,
            "/api/partners/links",
            json!({ "kind": "veiculo", "id": v }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let second: Value = app.get(&token, &format!("/api/drivers/{}", d2)).await.json().await.unwrap();
    let vehicle: Value = app.get(&token, &format!("/api/vehicles/{}", v)).await.json().await.unwrap();
    assert!(second["veiculoVinculado"].is_null());
    assert!(vehicle["motoristaVinculado"].is_null());
}

#[tokio::test]
async fn linking_across_partners_is_refused() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let a = id_of(&app.create(&token, "/api/partners", json!({ "tipo": "PJ", "nome": "A" })).await);
    let b = id_of(&app.create(&token, "/api/partners", json!({ "tipo": "PJ", "nome": "B" })).await);
    let driver = id_of(
        &app.create(&token, &format!("/api/partners/{}/drivers", a), json!({ "nome": "Motorista A" }))
            .await,
    );
    let vehicle = id_of(
        &app.create(
            &token,
            &format!("/api/partners/{}/vehicles", b),
            json!({ "tipo": "Truck", "placa": "BBB0B00" }),
        )
        .await,
    );

    let res = app
        .send(
            reqwest::Method::POST,
            &token,
            "/api/partners/links",
            json!({ "kind": "motorista", "sourceId": driver, "targetId": vehicle }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app
        .send(
            reqwest::Method::POST,
            &token,
            "/api/partners/links",
            json!({ "kind": "motorista", "sourceId": "nao-e-uuid", "targetId": vehicle }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paying_an_expense_leaves_pending_totals() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let before: Value = app.get(&token, "/api/finance/stats").await.json().await.unwrap();

    let movement = app
        .create(
            &token,
            "/api/finance/movements",
            json!({ "tipo": "despesa", "valor": 350.0, "descricao": "Pedágio BR-116", "categoria": "Pedágios" }),
        )
        .await;
    assert_eq!(movement["status"], "pendente");

    let pending: Value = app.get(&token, "/api/finance/stats").await.json().await.unwrap();
    let diff = |stats: &Value, key: &str| stats[key].as_f64().unwrap() - before[key].as_f64().unwrap();
    assert_eq!(diff(&pending, "despesasPendentes"), 350.0);
    assert_eq!(diff(&pending, "totalDespesas"), 350.0);

    let res = app
        .send(
            reqwest::Method::PATCH,
            &token,
            &format!("/api/finance/movements/{}/status", id_of(&movement)),
            json!({ "status": "pago" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let paid: Value = app.get(&token, "/api/finance/stats").await.json().await.unwrap();
    assert_eq!(diff(&paid, "despesasPendentes"), 0.0);
    assert_eq!(diff(&paid, "totalDespesas"), 350.0);

    // Valor zero não passa
    let res = app
        .send(
            reqwest::Method::POST,
            &token,
            "/api/finance/movements",
            json!({ "tipo": "receita", "valor": 0.0, "descricao": "Nada" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn view_only_user_cannot_edit() {
    let app = TestApp::spawn().await;
    let admin = app.token("admin", "admin123").await;

    app.create(
        &admin,
        "/api/users",
        json!({
            "username": "leitor",
            "password": "leitor123",
            "confirmPassword": "leitor123",
            "role": "comum",
            "permissions": {
                "inicio": "view",
                "financeiro": "none",
                "cargas": "view",
                "parceiros": "view",
                "usuarios": "none"
            }
        }),
    )
    .await;

    let token = app.token("leitor", "leitor123").await;

    assert_eq!(app.get(&token, "/api/cargoes").await.status(), StatusCode::OK);
    assert_eq!(app.get(&token, "/api/finance/movements").await.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(reqwest::Method::POST, &token, "/api/cargoes", json!({ "crt": "X1" }))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(reqwest::Method::POST, &token, "/api/partners", json!({ "tipo": "PJ", "nome": "Y" }))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_summarizes_demo_data() {
    let app = TestApp::spawn().await;
    let token = app.token("admin", "admin123").await;

    let summary: Value = app.get(&token, "/api/dashboard/summary").await.json().await.unwrap();
    assert_eq!(summary["cargas"]["total"], 2);
    assert_eq!(summary["totalParceiros"], 2);
    assert_eq!(summary["cargasRecentes"][0]["descricao"], "Materiais de construção");
}
