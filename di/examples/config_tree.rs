use fibre_di::{Parameter, Resolver, TypeCatalog, TypeInfo};
use serde_json::json;
use std::sync::Arc;

struct Cart {
  cookies: Vec<String>,
  currency: String,
}

fn describe_cart() -> TypeInfo {
  TypeInfo::builder::<Cart>()
    .constructor([Parameter::dynamic("cookies")], |args| {
      Ok(Cart {
        cookies: args.take("cookies")?,
        currency: String::new(),
      })
    })
    .setter("set_currency", |cart: &mut Cart, currency: String| {
      cart.currency = currency
    })
    .build()
}

fn main() -> fibre_di::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter("fibre_di=debug")
    .init();

  let catalog = Arc::new(TypeCatalog::new());
  catalog.register_with("shop::Cart", describe_cart);
  let resolver = Resolver::new(catalog);

  // `@name` refers to another service; `@@` escapes a literal sigil.
  resolver.load_json(&json!({
    "param": { "cookies": ["session", "locale"], "currency": "EUR" },
    "singleton": [
      { "id": "cart", "class": "shop::Cart", "args": { "cookies": "@cookies" },
        "params": { "currency": "@currency" } }
    ],
    "alias": { "basket": "cart" }
  }))?;

  let cart: Arc<Cart> = resolver.get_as("basket")?;
  println!("Cart cookies: {:?}, currency: {}", cart.cookies, cart.currency);
  assert_eq!(cart.cookies, vec!["session", "locale"]);
  assert_eq!(cart.currency, "EUR");

  for service in resolver.services() {
    println!(
      "{:<10} {:<10} {:?} materialized={}",
      service.id, service.scope.as_str(), service.class, service.materialized
    );
  }
  Ok(())
}
