//! The runtime relation contract, as seen from Rust.
//!
//! Generated relation accessors implement `OneToOneRelation` or
//! `OneToManyRelation` from the configured runtime package. These traits
//! mirror that contract so data layers written in Rust can drive the same
//! accessors (and so the generated bodies can be exercised in tests).

/// The side of a relation that stores the foreign key.
pub trait ReferencedBy<T> {
    fn set_related_id(&self, item: &mut T, id: Option<i64>);
}

/// `base` refers to exactly one `K` through a key stored on `base`.
pub trait OneToOneRelation<T, K>: ReferencedBy<T> {
    fn referenced_key(&self, base: &T) -> Option<i64>;
    fn set_referenced_object(&self, base: &mut T, related: K);
}

/// `base` owns many `K`, each carrying the key of its owner.
pub trait OneToManyRelation<T, K>: ReferencedBy<K> {
    fn referenced_key(&self, related: &K) -> Option<i64>;
    fn set_referenced_object(&self, base: &mut T, related: Vec<K>);
}

/// The first item, or `None` for a missing or empty sequence.
pub fn first_or_default<I: IntoIterator>(items: Option<I>) -> Option<I::Item> {
    items?.into_iter().next()
}

/// Attaches every item of `related` to `base`: each item receives the key
/// of `base`, then the whole list is handed to the accessor.
pub fn link_many<T, K, R>(relation: &R, base: &mut T, key: Option<i64>, mut related: Vec<K>)
where
    R: OneToManyRelation<T, K> + ?Sized,
{
    for item in &mut related {
        relation.set_related_id(item, key);
    }
    relation.set_referenced_object(base, related);
}
