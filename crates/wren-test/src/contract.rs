//! A shared conformance suite exercised against every `MemoryPort<Message>`
//! implementation, so in-memory and file-backed storage are held to
//! identical behavior instead of duplicating the same assertions per crate.

use wren_llm::Message;
use wren_memory::MemoryPort;

/// Run the full `MemoryPort<Message>` contract against `port`, panicking on
/// the first violation.
///
/// Intended to be invoked from a `#[tokio::test]` in each concrete
/// implementation's own test module, e.g.:
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn satisfies_the_memory_port_contract() {
///     memory_port_contract_suite(&InMemoryStore::<Message>::new()).await;
/// }
/// ```
///
/// # Panics
///
/// Panics on the first assertion the implementation under test fails, or
/// if any underlying operation returns an error.
pub async fn memory_port_contract_suite<P>(port: &P)
where
    P: MemoryPort<Message>,
{
    let key = "contract-suite-key";

    assert!(
        port.get(key).await.expect("get on a fresh key").is_empty(),
        "a fresh key starts empty"
    );

    port.append(key, Message::user("first")).await.expect("append");
    port.append(key, Message::user("second")).await.expect("append");
    let items = port.get(key).await.expect("get after appends");
    assert_eq!(items.len(), 2, "appends accumulate in order");
    assert_eq!(items[0].content.as_text(), "first");
    assert_eq!(items[1].content.as_text(), "second");

    port.set(key, vec![Message::user("replaced")]).await.expect("set");
    let items = port.get(key).await.expect("get after set");
    assert_eq!(items.len(), 1, "set replaces the whole list rather than appending");
    assert_eq!(items[0].content.as_text(), "replaced");

    let keys = port.keys().await.expect("keys");
    assert!(keys.contains(&key.to_string()), "a populated key is listed");

    port.delete(key).await.expect("delete");
    assert!(port.get(key).await.expect("get after delete").is_empty(), "delete clears the key");
    let keys = port.keys().await.expect("keys after delete");
    assert!(!keys.contains(&key.to_string()), "a deleted key is no longer listed");
}
