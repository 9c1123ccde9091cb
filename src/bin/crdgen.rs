//! Print the AlertManagerDefinition CRD as YAML
//!
//! ```bash
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use amp_alertmanager_controller::AlertManagerDefinition;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&AlertManagerDefinition::crd())?);
    Ok(())
}
