use gatekeeper_lib::{Actor, Gatekeeper, GatekeeperConfig, Percentage};
use tracing_subscriber::EnvFilter;

struct User {
    id: u64,
    admin: bool,
}

impl Actor for User {
    fn actor_id(&self) -> String {
        self.id.to_string()
    }

    fn capability(&self, name: &str) -> Option<bool> {
        (name == "admin").then_some(self.admin)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = GatekeeperConfig::load("gatekeeper.toml");
    config.apply_env_overrides();
    let gk = Gatekeeper::from_config(&config)?;

    gk.register_group("admins", |actor| actor.capability("admin") == Some(true));

    let checkout = gk.feature("new-checkout")?;
    checkout.enable_group("admins")?;

    let users: Vec<User> = (1..=20)
        .map(|id| User {
            id,
            admin: id == 7,
        })
        .collect();

    for percentage in [0, 10, 25, 50, 100] {
        checkout.enable_percentage_of_actors(Percentage::new(percentage)?)?;
        let mut enabled = Vec::new();
        for user in &users {
            if checkout.is_enabled(Some(user as &dyn Actor))? {
                enabled.push(user.id);
            }
        }
        tracing::info!(percentage, ?enabled, "rollout stage");
    }

    checkout.disable_all()?;
    tracing::info!(state = ?checkout.state()?, "after disable_all");

    Ok(())
}
