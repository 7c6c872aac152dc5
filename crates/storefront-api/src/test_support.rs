//! In-process mock backend for client tests.
//!
//! Compiled for this crate's own tests and, behind the `test-support`
//! feature, for downstream crates that drive a real `ApiClient`.
//!
//! Runs an axum server on a random local port with a small fixed catalog
//! and three accounts:
//!
//! | Token       | Account            | Card | e-Points | Role  |
//! |-------------|--------------------|------|----------|-------|
//! | `tok-user`  | asha@example.in    | yes  | 2000     | USER  |
//! | `tok-basic` | ravi@example.in    | no   | 0        | USER  |
//! | `tok-admin` | admin@example.in   | no   | 0        | ADMIN |
//!
//! Cart summaries are computed with the same pricing functions the client
//! uses, with a flat ₹15 platform fee.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::client::{ApiClient, ApiConfig};
use crate::endpoints::orders::IDEMPOTENCY_HEADER;
use crate::token::MemoryTokenStore;
use storefront_core::pricing::{effective_price, resolve_purchase};
use storefront_core::{
    Address, ApplicationStatus, Cart, CartItem, CartSummary, Category, LoyaltyCardApplication,
    Money, Order, OrderStatus, PaymentMethod, Points, Product, PurchaseType, Role, Store, User,
};

const PLATFORM_FEE_MAJOR: i64 = 15;

type Shared = Arc<Mutex<MockState>>;
type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

struct Line {
    product_id: String,
    quantity: i64,
    purchase_type: PurchaseType,
}

struct Account {
    password: String,
    token: String,
}

struct MockState {
    users: HashMap<String, User>,
    accounts: HashMap<String, Account>,
    products: Vec<Product>,
    carts: HashMap<String, Vec<Line>>,
    orders: Vec<(String, Order)>,
    addresses: Vec<Address>,
    loyalty: HashMap<String, LoyaltyCardApplication>,
    idempotency_keys: Vec<String>,
    placed_by_key: HashMap<String, Value>,
    next_id: u64,
}

impl MockState {
    fn seeded() -> Self {
        let mut state = MockState {
            users: HashMap::new(),
            accounts: HashMap::new(),
            products: vec![
                product("p-1", "Basmati Rice 5kg", Money::from_major(1000), None, "grocery"),
                product("p-2", "Olive Oil 1L", Money::from_major(500), Some(10.0), "grocery"),
                product("p-3", "Steel Bottle", Money::from_minor(39950), None, "home"),
            ],
            carts: HashMap::new(),
            orders: Vec::new(),
            addresses: Vec::new(),
            loyalty: HashMap::new(),
            idempotency_keys: Vec::new(),
            placed_by_key: HashMap::new(),
            next_id: 1,
        };

        state.add_user("tok-user", "Asha", "asha@example.in", "secret1", true, 2000, Role::User);
        state.add_user("tok-basic", "Ravi", "ravi@example.in", "secret2", false, 0, Role::User);
        state.add_user("tok-admin", "Admin", "admin@example.in", "admin123", false, 0, Role::Admin);
        state
    }

    #[allow(clippy::too_many_arguments)]
    fn add_user(
        &mut self,
        token: &str,
        name: &str,
        email: &str,
        password: &str,
        card_holder: bool,
        points: i64,
        role: Role,
    ) {
        let user = User {
            id: format!("u-{}", self.users.len() + 1),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            card_holder,
            e_points: Points::new(points),
            role,
        };
        self.users.insert(token.to_string(), user);
        self.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                token: token.to_string(),
            },
        );
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    fn cart_for(&self, token: &str) -> Cart {
        let user = self.users.get(token);
        let mut items = Vec::new();
        let mut mrp_total = Money::zero();
        let mut points_used = Points::zero();

        for line in self.carts.get(token).into_iter().flatten() {
            let Some(product) = self.products.iter().find(|p| p.id == line.product_id) else {
                continue;
            };
            let quote = resolve_purchase(product, user, line.purchase_type).for_quantity(line.quantity);
            let line_price = effective_price(product).multiply_quantity(line.quantity);

            mrp_total += line_price;
            points_used = points_used + quote.points;
            items.push(CartItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                brand: product.brand.clone(),
                image_url: None,
                quantity: line.quantity,
                purchase_type: quote.purchase_type,
                points_used: quote.points,
                price: line_price,
            });
        }

        let platform_fee = if items.is_empty() {
            Money::zero()
        } else {
            Money::from_major(PLATFORM_FEE_MAJOR)
        };
        let e_points_discount = points_used.value();

        Cart {
            items,
            summary: CartSummary {
                mrp_total,
                e_points_discount,
                coupon_discount: Money::zero(),
                platform_fee,
                total_payable: mrp_total - e_points_discount + platform_fee,
                points_used,
                points_earned: Points::zero(),
                points_available: user.map(|u| u.e_points).unwrap_or_default(),
            },
        }
    }
}

fn product(id: &str, name: &str, price: Money, discount: Option<f64>, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: Some("Acme".to_string()),
        normal_price: price,
        discount_percent: discount,
        image_url: None,
        category: Some(category.to_string()),
        description: None,
        in_stock: true,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Json<Value> {
    Json(serde_json::to_value(value).unwrap())
}

fn fail(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolves the caller or answers 401.
fn caller(state: &MockState, headers: &HeaderMap) -> Result<(String, User), (StatusCode, Json<Value>)> {
    bearer(headers)
        .and_then(|token| state.users.get(&token).cloned().map(|user| (token, user)))
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, json!({ "error": "Full authentication is required" })))
}

fn admin(state: &MockState, headers: &HeaderMap) -> Result<User, (StatusCode, Json<Value>)> {
    let (_, user) = caller(state, headers)?;
    if !user.is_admin() {
        return Err(fail(StatusCode::FORBIDDEN, json!({ "message": "Access denied" })));
    }
    Ok(user)
}

// =============================================================================
// Server
// =============================================================================

pub struct MockBackend {
    state: Shared,
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::seeded()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to get local address");

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/me", get(me))
            .route("/api/products", get(list_products))
            .route("/api/products/:id", get(get_product))
            .route("/api/categories", get(categories))
            .route("/api/cart", get(get_cart).delete(clear_cart))
            .route("/api/cart/items", post(add_item))
            .route("/api/cart/items/:id", put(update_item).delete(remove_item))
            .route("/api/orders", post(place_order).get(list_orders))
            .route("/api/orders/:id", get(get_order))
            .route("/api/orders/:id/cancel", post(cancel_order))
            .route("/api/payments/verify", post(verify_payment))
            .route("/api/addresses", get(list_addresses).post(add_address))
            .route("/api/addresses/:id", delete(delete_address))
            .route("/api/stores", get(stores))
            .route("/api/loyalty/apply", post(apply_loyalty))
            .route("/api/loyalty/status", get(loyalty_status))
            .route("/api/admin/orders", get(admin_orders))
            .route("/api/admin/orders/:id/status", put(admin_set_status))
            .route("/api/admin/metrics", get(admin_metrics))
            .route("/actuator/health", get(health))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });

        MockBackend {
            state,
            addr,
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client pointed at this backend, optionally already signed in.
    pub fn client(&self, token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        };
        ApiClient::new(ApiConfig::new(self.url()), Arc::new(store)).unwrap()
    }

    pub async fn idempotency_keys(&self) -> Vec<String> {
        self.state.lock().await.idempotency_keys.clone()
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let state = state.lock().await;
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match state.accounts.get(email) {
        Some(account) if account.password == password => {
            let user = &state.users[&account.token];
            Ok(Json(json!({ "token": account.token, "user": user })))
        }
        _ => Err(fail(StatusCode::UNAUTHORIZED, json!({ "error": "Bad credentials" }))),
    }
}

/// Answers with the token only, so the client has to call `/me`.
async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().await;
    let email = body["email"].as_str().unwrap_or_default().to_string();

    if state.accounts.contains_key(&email) {
        return Err(fail(StatusCode::CONFLICT, json!({ "error": "Email already registered" })));
    }

    let token = state.next_id("tok");
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state.add_user(&token, &name, &email, &password, false, 0, Role::User);

    Ok(Json(json!({ "accessToken": token })))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    let (_, user) = caller(&state, &headers)?;
    Ok(to_json(&user))
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Deserialize)]
struct ProductParams {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_size")]
    size: usize,
    q: Option<String>,
    category: Option<String>,
}

fn default_size() -> usize {
    20
}

async fn list_products(State(state): State<Shared>, Query(params): Query<ProductParams>) -> Reply {
    let state = state.lock().await;
    let q = params.q.map(|q| q.to_lowercase());

    let matching: Vec<&Product> = state
        .products
        .iter()
        .filter(|p| q.as_ref().map_or(true, |q| p.name.to_lowercase().contains(q)))
        .filter(|p| {
            params
                .category
                .as_ref()
                .map_or(true, |c| p.category.as_deref() == Some(c.as_str()))
        })
        .collect();

    let total = matching.len();
    let size = params.size.max(1);
    let content: Vec<&Product> = matching.into_iter().skip(params.page * size).take(size).collect();

    Ok(Json(json!({
        "content": content,
        "number": params.page,
        "size": size,
        "totalElements": total,
        "totalPages": total.div_ceil(size),
    })))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Reply {
    let state = state.lock().await;
    state
        .products
        .iter()
        .find(|p| p.id == id)
        .map(to_json)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, json!({ "title": "Not Found" })))
}

async fn categories() -> Reply {
    let categories = vec![
        Category {
            id: "grocery".to_string(),
            name: "Grocery".to_string(),
        },
        Category {
            id: "home".to_string(),
            name: "Home".to_string(),
        },
    ];
    Ok(to_json(&categories))
}

// =============================================================================
// Cart
// =============================================================================

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    Ok(to_json(&state.cart_for(&token)))
}

async fn add_item(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;

    let product_id = body["productId"].as_str().unwrap_or_default().to_string();
    if !state.products.iter().any(|p| p.id == product_id) {
        return Err(fail(StatusCode::NOT_FOUND, json!({ "message": "Product not found" })));
    }
    let quantity = body["quantity"].as_i64().unwrap_or(1);
    let purchase_type: PurchaseType = serde_json::from_value(body["purchaseType"].clone()).unwrap_or_default();

    let lines = state.carts.entry(token.clone()).or_default();
    match lines.iter_mut().find(|l| l.product_id == product_id) {
        Some(line) => {
            line.quantity += quantity;
            line.purchase_type = purchase_type;
        }
        None => lines.push(Line {
            product_id,
            quantity,
            purchase_type,
        }),
    }

    Ok(to_json(&state.cart_for(&token)))
}

async fn update_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;

    let lines = state.carts.entry(token.clone()).or_default();
    let Some(line) = lines.iter_mut().find(|l| l.product_id == id) else {
        return Err(fail(StatusCode::NOT_FOUND, json!({ "message": "Item not in cart" })));
    };
    if let Some(quantity) = body["quantity"].as_i64() {
        line.quantity = quantity;
    }
    if let Ok(purchase_type) = serde_json::from_value(body["purchaseType"].clone()) {
        line.purchase_type = purchase_type;
    }

    Ok(to_json(&state.cart_for(&token)))
}

async fn remove_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    state.carts.entry(token).or_default().retain(|l| l.product_id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    state.carts.remove(&token);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders & Payments
// =============================================================================

async fn place_order(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;

    let key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|k| format!("{}:{}", token, k));
    if let Some(raw) = headers.get(IDEMPOTENCY_HEADER).and_then(|v| v.to_str().ok()) {
        state.idempotency_keys.push(raw.to_string());
    }
    if let Some(reply) = key.as_ref().and_then(|k| state.placed_by_key.get(k)) {
        return Ok(Json(reply.clone()));
    }

    let cart = state.cart_for(&token);
    if cart.is_empty() {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            json!({ "code": "CART_EMPTY", "message": "Your cart is empty" }),
        ));
    }

    let payment_method: PaymentMethod =
        serde_json::from_value(body["paymentMethod"].clone()).unwrap_or_default();
    let status = match payment_method {
        PaymentMethod::Online => OrderStatus::PendingPayment,
        PaymentMethod::CashOnDelivery => OrderStatus::Placed,
    };

    let order = Order {
        id: state.next_id("ord"),
        status,
        items: cart.items,
        summary: cart.summary,
        payment_method,
        address_id: body["addressId"].as_str().map(str::to_string),
        store_id: body["storeId"].as_str().map(str::to_string),
        created_at: Some(Utc::now()),
    };
    state.carts.remove(&token);
    state.orders.push((token, order.clone()));

    let mut reply = serde_json::to_value(&order).unwrap();
    reply["razorpayOrderId"] = json!(format!("rzp_{}", order.id));
    if let Some(key) = key {
        state.placed_by_key.insert(key, reply.clone());
    }
    Ok(Json(reply))
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    let orders: Vec<&Order> = state
        .orders
        .iter()
        .filter(|(owner, _)| *owner == token)
        .map(|(_, o)| o)
        .collect();
    Ok(to_json(&orders))
}

fn own_order<'a>(
    state: &'a mut MockState,
    token: &str,
    id: &str,
) -> Result<&'a mut Order, (StatusCode, Json<Value>)> {
    state
        .orders
        .iter_mut()
        .find(|(owner, o)| owner == token && o.id == id)
        .map(|(_, o)| o)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, json!({ "message": "Order not found" })))
}

async fn get_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    let order = own_order(&mut state, &token, &id)?;
    Ok(to_json(order))
}

async fn cancel_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    let order = own_order(&mut state, &token, &id)?;

    if !order.status.is_cancellable() {
        return Err(fail(StatusCode::CONFLICT, json!({ "error": "Order cannot be cancelled" })));
    }
    order.status = OrderStatus::Cancelled;
    Ok(to_json(order))
}

async fn verify_payment(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;

    let order_id = body["orderId"].as_str().unwrap_or_default().to_string();
    if body["signature"].as_str() != Some("sig-ok") {
        return Err(fail(StatusCode::BAD_REQUEST, json!({ "message": "Payment signature mismatch" })));
    }

    let order = own_order(&mut state, &token, &order_id)?;
    order.status = OrderStatus::Placed;
    Ok(to_json(order))
}

// =============================================================================
// Account
// =============================================================================

async fn list_addresses(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    caller(&state, &headers)?;
    Ok(to_json(&state.addresses))
}

async fn add_address(State(state): State<Shared>, headers: HeaderMap, Json(mut address): Json<Address>) -> Reply {
    let mut state = state.lock().await;
    caller(&state, &headers)?;
    address.id = Some(state.next_id("addr"));
    state.addresses.push(address.clone());
    Ok(to_json(&address))
}

async fn delete_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut state = state.lock().await;
    caller(&state, &headers)?;

    let before = state.addresses.len();
    state.addresses.retain(|a| a.id.as_deref() != Some(id.as_str()));
    if state.addresses.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, json!({ "message": "Address not found" })));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn stores() -> Reply {
    let stores = vec![
        Store {
            id: "s-1".to_string(),
            name: "Marine Drive".to_string(),
            city: "Kochi".to_string(),
            address: Some("Marine Drive, Ernakulam".to_string()),
            phone: None,
        },
        Store {
            id: "s-2".to_string(),
            name: "Indiranagar".to_string(),
            city: "Bengaluru".to_string(),
            address: None,
            phone: Some("8012345678".to_string()),
        },
    ];
    Ok(to_json(&stores))
}

async fn apply_loyalty(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;

    if state.loyalty.contains_key(&token) {
        return Err(fail(StatusCode::CONFLICT, json!({ "message": "Application already submitted" })));
    }

    let application = LoyaltyCardApplication {
        status: ApplicationStatus::Pending,
        applied_at: Some(Utc::now()),
        card_number: None,
    };
    state.loyalty.insert(token, application.clone());
    Ok(to_json(&application))
}

async fn loyalty_status(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    let (token, _) = caller(&state, &headers)?;
    state
        .loyalty
        .get(&token)
        .map(to_json)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, json!({ "message": "No application" })))
}

// =============================================================================
// Admin
// =============================================================================

#[derive(Deserialize)]
struct StatusParams {
    status: Option<OrderStatus>,
}

async fn admin_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<StatusParams>,
) -> Reply {
    let state = state.lock().await;
    admin(&state, &headers)?;
    let orders: Vec<&Order> = state
        .orders
        .iter()
        .map(|(_, o)| o)
        .filter(|o| params.status.map_or(true, |s| o.status == s))
        .collect();
    Ok(to_json(&orders))
}

async fn admin_set_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().await;
    admin(&state, &headers)?;

    let status: OrderStatus = serde_json::from_value(body["status"].clone())
        .map_err(|e| fail(StatusCode::BAD_REQUEST, json!({ "message": e.to_string() })))?;

    let order = state
        .orders
        .iter_mut()
        .map(|(_, o)| o)
        .find(|o| o.id == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, json!({ "message": "Order not found" })))?;
    order.status = status;
    Ok(to_json(order))
}

async fn admin_metrics(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().await;
    admin(&state, &headers)?;
    Ok(Json(json!({
        "orders.total": state.orders.len(),
        "users.total": state.users.len(),
        "jvm.memory.used": 183_500_800u64,
    })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}
