//! JSON shape of a serialized forest.
#![cfg(feature = "serde")]

use serde_json::{Value, json};

use html2nodes::{ParseOptions, parse_html};

fn to_json(html: &str) -> Value {
    let tree = parse_html(html, &ParseOptions::default()).unwrap();
    serde_json::to_value(&tree).unwrap()
}

#[test]
fn test_nested_forest() {
    let value = to_json(r#"<p>Hi <b>there</b></p><img src="a.png" width="4">"#);
    assert_eq!(
        value,
        json!([
            {
                "key": "0",
                "isWithinTextContainer": false,
                "type": "TextContainer",
                "isAfterHeader": false,
                "children": [
                    {
                        "key": "0_0",
                        "parentKey": "0",
                        "isWithinTextContainer": true,
                        "type": "Text",
                        "content": "Hi ",
                        "isBold": false,
                        "isItalic": false,
                        "isUnderlined": false,
                        "hasStrikethrough": false,
                        "isWithinLink": false,
                        "isWithinList": false,
                        "canBeTextContainerBase": true,
                        "isAfterHeader": false
                    },
                    {
                        "key": "0_1",
                        "parentKey": "0",
                        "isWithinTextContainer": true,
                        "type": "Text",
                        "content": "there",
                        "isBold": true,
                        "isItalic": false,
                        "isUnderlined": false,
                        "hasStrikethrough": false,
                        "isWithinLink": false,
                        "isWithinList": false,
                        "canBeTextContainerBase": false,
                        "isAfterHeader": false
                    }
                ]
            },
            {
                "key": "1",
                "isWithinTextContainer": false,
                "type": "Image",
                "source": "a.png",
                "width": 4.0
            }
        ])
    );
}

#[test]
fn test_link_and_list_fields() {
    let value = to_json(r##"<ol start="2"><li id="x">a</li></ol><a href="#x">to a</a>"##);
    assert_eq!(value[0]["type"], "List");
    assert_eq!(value[0]["isOrdered"], true);
    assert_eq!(value[0]["start"], 2);

    let item = &value[0]["children"][0];
    assert_eq!(item["type"], "ListItem");
    assert_eq!(item["isLinkedTo"], true);
    assert_eq!(item["children"][0]["isFirstChildInListItem"], true);

    let link = &value[1];
    assert_eq!(link["type"], "InternalLink");
    assert_eq!(link["domId"], "x");
    assert_eq!(link["targetKey"], "0_0");
    assert_eq!(link["hasResolvedTarget"], true);
}
