//! A small application wired through the default registry: configuration is
//! bound up front, the database client is opened lazily by a provider, and
//! the services on top resolve implicitly from their recipes.
//!
//! Run with: cargo run --example sample_app

use std::sync::Arc;

use wirebox::{injectable, DiError};

#[derive(Default, Clone)]
struct DbConfig {
    dsn: String,
    pool: u32,
}
injectable!(DbConfig {});

#[derive(Default, Clone)]
struct HttpConfig {
    listen: String,
}
injectable!(HttpConfig {});

#[derive(Default)]
struct DbClient {
    dsn: String,
}
injectable!(DbClient {});

impl DbClient {
    fn query(&self, sql: &str) -> String {
        format!("[{}] {sql} -> 3 rows", self.dsn)
    }
}

fn open_db(config: Arc<DbConfig>) -> Result<DbClient, DiError> {
    if config.dsn.is_empty() {
        return Err(DiError::constructor::<DbClient>("empty DSN"));
    }
    println!("opening database ({} connections)", config.pool);
    Ok(DbClient { dsn: config.dsn.clone() })
}

#[derive(Default)]
struct UserService {
    db: Option<Arc<DbClient>>,
}
injectable!(UserService {
    db: shared DbClient,
});

impl UserService {
    fn list_users(&self) -> String {
        self.db.as_ref().unwrap().query("SELECT * FROM users")
    }
}

#[derive(Default)]
struct Server {
    http: Option<Arc<HttpConfig>>,
    users: Option<Arc<UserService>>,
}
injectable!(Server {
    http: shared HttpConfig,
    users: shared UserService,
});

impl Server {
    fn handle_request(&self) {
        println!("{} serving: {}", self.http.as_ref().unwrap().listen, self.users.as_ref().unwrap().list_users());
    }
}

fn main() {
    wirebox::bind_instance(DbConfig {
        dsn: "postgres://localhost/app".into(),
        pool: 8,
    });
    wirebox::bind_instance(HttpConfig {
        listen: "127.0.0.1:8080".into(),
    });

    // Runs at most once, on the first resolve of DbClient.
    wirebox::bind_provider(open_db);

    // Server and UserService have no explicit bindings; their recipes build
    // them on first use and the registry caches the result.
    let server = wirebox::instance::<Server>();
    server.handle_request();
    server.handle_request();
}
