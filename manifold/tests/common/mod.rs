use manifold::Variables;

/// The model type the test applications route to.
#[derive(Debug, PartialEq, Eq)]
pub struct Item {
    pub id: String,
}

/// Model factory for `/items/{id}`-style routes.
pub fn item_factory(variables: &Variables) -> Option<Item> {
    variables.get("id").map(|id| Item { id: id.clone() })
}
