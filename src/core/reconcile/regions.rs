use indexmap::IndexMap;
use serde_json::{Map, Value};

pub(crate) const PARALLEL_KEY: &str = "parallel";
const IDENTIFIER_KEY: &str = "identifier";

/// Array-valued fields the reconciler treats differently from a generic list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// `stages[]`: `{stage: {identifier}}` elements, possibly in `parallel` groups.
    Stages,
    /// `steps[]` / `rollbackSteps[]`: `{step}` or `{stepGroup}` elements.
    Steps,
    /// `variables[]`: keyed records merged by name.
    Variables,
}

const REGIONS: &[(&str, Region)] = &[
    ("stages", Region::Stages),
    ("steps", Region::Steps),
    ("rollbackSteps", Region::Steps),
    ("variables", Region::Variables),
];

impl Region {
    pub fn for_field(field: Option<&str>) -> Option<Region> {
        let field = field?;
        REGIONS
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, region)| *region)
    }

    /// Wrapper keys whose `identifier` identifies an element of this region.
    /// `None` accepts any single-key wrapper.
    pub(crate) fn element_kinds(self) -> Option<&'static [&'static str]> {
        match self {
            Region::Stages => Some(&["stage"]),
            Region::Steps => Some(&["step", "stepGroup"]),
            Region::Variables => None,
        }
    }
}

/// Identity of a list element: wrapper kind plus identifier. Elements that
/// carry `identifier` directly use an empty kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ElementKey {
    pub kind: String,
    pub identifier: String,
}

pub(crate) fn parallel_group(element: &Value) -> Option<&Vec<Value>> {
    element.as_object()?.get(PARALLEL_KEY)?.as_array()
}

pub(crate) fn element_key(element: &Value, kinds: Option<&[&str]>) -> Option<ElementKey> {
    let map = element.as_object()?;
    if let Some(identifier) = map.get(IDENTIFIER_KEY).and_then(Value::as_str) {
        return Some(ElementKey {
            kind: String::new(),
            identifier: identifier.to_string(),
        });
    }
    let (kind, inner) = wrapper(map, kinds)?;
    let identifier = inner.get(IDENTIFIER_KEY)?.as_str()?;
    Some(ElementKey {
        kind: kind.to_string(),
        identifier: identifier.to_string(),
    })
}

fn wrapper<'v>(map: &'v Map<String, Value>, kinds: Option<&[&str]>) -> Option<(&'v str, &'v Value)> {
    let found = match kinds {
        Some(kinds) => kinds
            .iter()
            .find_map(|kind| map.get_key_value(*kind))
            .map(|(kind, inner)| (kind.as_str(), inner)),
        None if map.len() == 1 => map.iter().next().map(|(kind, inner)| (kind.as_str(), inner)),
        None => None,
    };
    found.filter(|(_, inner)| inner.is_object())
}

/// Lookup of list elements by identity, looking through `parallel` groups.
/// The first element with a given identity wins.
pub(crate) struct ElementIndex<'v> {
    elements: IndexMap<ElementKey, &'v Value>,
}

impl<'v> ElementIndex<'v> {
    pub(crate) fn build(items: Option<&'v [Value]>, kinds: Option<&[&str]>) -> Self {
        let mut index = ElementIndex {
            elements: IndexMap::new(),
        };
        if let Some(items) = items {
            index.insert_all(items, kinds);
        }
        index
    }

    fn insert_all(&mut self, items: &'v [Value], kinds: Option<&[&str]>) {
        for item in items {
            if let Some(group) = parallel_group(item) {
                self.insert_all(group, kinds);
            } else if let Some(key) = element_key(item, kinds) {
                self.elements.entry(key).or_insert(item);
            }
        }
    }

    pub(crate) fn get(&self, key: &ElementKey) -> Option<&'v Value> {
        self.elements.get(key).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }
}
