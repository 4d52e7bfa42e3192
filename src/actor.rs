/// Anything a feature can be evaluated against: a user, an account, a request.
///
/// The only hard requirement is a stable identifier. Group predicates may ask
/// for additional capabilities through [`Actor::capability`]; an actor that
/// doesn't know the capability answers `None`.
pub trait Actor {
    fn actor_id(&self) -> String;

    /// Looks up a named boolean capability such as `"admin"`.
    fn capability(&self, _name: &str) -> Option<bool> {
        None
    }
}

impl Actor for str {
    fn actor_id(&self) -> String {
        self.to_string()
    }
}

impl Actor for String {
    fn actor_id(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_actor_for_int {
    ($($t:ty),*) => {
        $(
            impl Actor for $t {
                fn actor_id(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_actor_for_int!(i32, i64, u32, u64, usize);
