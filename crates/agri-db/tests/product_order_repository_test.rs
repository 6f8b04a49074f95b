//! Integration tests for the Product and Order repository
//! implementations and their tenant isolation, using in-memory SurrealDB.

use agri_core::error::AgriError;
use agri_core::models::farmer::CreateFarmer;
use agri_core::models::order::{NewOrder, OrderStatus};
use agri_core::models::product::CreateProduct;
use agri_core::repository::{FarmerRepository, OrderRepository, Pagination, ProductRepository};
use agri_db::repository::{
    SurrealFarmerRepository, SurrealOrderRepository, SurrealProductRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    agri_db::run_migrations(&db).await.unwrap();
    db
}

async fn farmer_id(db: &Surreal<Db>, tenant_id: i64) -> Uuid {
    SurrealFarmerRepository::new(db.clone())
        .create(
            tenant_id,
            CreateFarmer {
                name: "Orchard".into(),
                location: "Nantou".into(),
            },
        )
        .await
        .unwrap()
        .id
}

fn pending(product_id: Uuid, quantity: i64, total_price: f64) -> NewOrder {
    NewOrder {
        product_id,
        quantity,
        total_price,
        buyer_id: 55,
        status: OrderStatus::Pending,
    }
}

#[tokio::test]
async fn product_created_by_one_tenant_is_hidden_from_another() {
    let db = setup().await;
    let farmer = farmer_id(&db, 1).await;
    let repo = SurrealProductRepository::new(db);

    let apple = repo
        .create(
            1,
            CreateProduct {
                name: "Apple".into(),
                price: 25.5,
                farmer_id: farmer,
            },
        )
        .await
        .unwrap();
    assert_eq!(apple.price, 25.5);
    assert_eq!(apple.farmer_id, farmer);

    let t1 = repo.list(1, Pagination::default()).await.unwrap();
    assert!(t1.items.iter().any(|p| p.name == "Apple"));

    let t2 = repo.list(2, Pagination::default()).await.unwrap();
    assert!(t2.items.is_empty());

    let err = repo.get_by_id(2, apple.id).await.unwrap_err();
    assert!(matches!(err, AgriError::NotFound { .. }));
}

#[tokio::test]
async fn update_price_and_list_by_farmer() {
    let db = setup().await;
    let farmer = farmer_id(&db, 1).await;
    let other_farmer = farmer_id(&db, 1).await;
    let repo = SurrealProductRepository::new(db);

    let rice = repo
        .create(
            1,
            CreateProduct {
                name: "Rice".into(),
                price: 10.0,
                farmer_id: farmer,
            },
        )
        .await
        .unwrap();
    repo.create(
        1,
        CreateProduct {
            name: "Tea".into(),
            price: 30.0,
            farmer_id: other_farmer,
        },
    )
    .await
    .unwrap();

    let updated = repo.update_price(1, rice.id, 12.5).await.unwrap();
    assert_eq!(updated.price, 12.5);

    let cross = repo.update_price(2, rice.id, 1.0).await;
    assert!(matches!(cross, Err(AgriError::NotFound { .. })));

    let own = repo.list_by_farmer(1, farmer).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, rice.id);
    assert!(repo.list_by_farmer(2, farmer).await.unwrap().is_empty());
}

#[tokio::test]
async fn order_round_trip_and_status_update() {
    let db = setup().await;
    let repo = SurrealOrderRepository::new(db);
    let product = Uuid::new_v4();

    let order = repo.create(1, pending(product, 3, 30.0)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, 30.0);
    assert_eq!(order.buyer_id, 55);

    let completed = repo
        .update_status(1, order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(completed.total_price, 30.0);

    let err = repo
        .update_status(2, order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, AgriError::NotFound { .. }));

    let fetched = repo.get_by_id(1, order.id).await.unwrap();
    assert_eq!(fetched.status, OrderStatus::Completed);
}

#[tokio::test]
async fn list_orders_by_products_filters_tenant_and_product() {
    let db = setup().await;
    let repo = SurrealOrderRepository::new(db);
    let wanted = Uuid::new_v4();
    let unrelated = Uuid::new_v4();

    repo.create(1, pending(wanted, 1, 5.0)).await.unwrap();
    repo.create(1, pending(wanted, 2, 10.0)).await.unwrap();
    repo.create(1, pending(unrelated, 1, 5.0)).await.unwrap();
    repo.create(2, pending(wanted, 9, 45.0)).await.unwrap();

    let orders = repo.list_by_products(1, &[wanted]).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.tenant_id == 1 && o.product_id == wanted));

    assert!(repo.list_by_products(1, &[]).await.unwrap().is_empty());

    let page = repo.list(1, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);
}
