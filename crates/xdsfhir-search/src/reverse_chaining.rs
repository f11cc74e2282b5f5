//! Reverse chained criteria (`_has`).
//!
//! `_has:List:item:identifier=<v>` selects resources that are the item of a
//! `List` carrying identifier `<v>`. Used instead of `_list`, which not every
//! server honours.

use xdsfhir_storage::SearchParams;

pub const HAS_LIST_ITEM_IDENTIFIER: &str = "_has:List:item:identifier";

/// Members of any list with one of the (URN coded) identifiers.
pub fn member_of_list<S: AsRef<str>>(params: &mut SearchParams, list_identifiers: &[S]) {
    if list_identifiers.is_empty() {
        return;
    }
    let value = list_identifiers
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    params.add_param(HAS_LIST_ITEM_IDENTIFIER, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_of_list() {
        let mut params = SearchParams::new("DocumentReference");
        member_of_list(&mut params, &["urn:oid:1.2.3", "urn:uuid:ss-1"]);
        assert_eq!(
            params.values(HAS_LIST_ITEM_IDENTIFIER),
            vec!["urn:oid:1.2.3,urn:uuid:ss-1"]
        );

        let mut params = SearchParams::new("List");
        member_of_list::<&str>(&mut params, &[]);
        assert!(params.is_empty());
    }
}
