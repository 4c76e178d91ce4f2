use zodgen_core::{DataModel, Entity, Field, FieldKind, validate_model};

#[test]
fn serializes_model_deterministically() {
    let model = DataModel {
        entities: vec![Entity {
            name: "Tag".to_string(),
            fields: vec![Field {
                name: "id".to_string(),
                kind: FieldKind::Scalar,
                type_name: "Int".to_string(),
                is_required: true,
                is_list: false,
                is_unique: false,
                is_id: true,
                is_read_only: false,
                has_default: true,
                is_generated: false,
                is_updated_at: false,
                relation: None,
                documentation: None,
            }],
            id_fields: Vec::new(),
            unique_groups: Vec::new(),
            documentation: None,
        }],
        enums: Vec::new(),
    };

    let json = serde_json::to_string_pretty(&model).expect("serialize model");
    let expected = r#"{
  "entities": [
    {
      "name": "Tag",
      "fields": [
        {
          "name": "id",
          "kind": "scalar",
          "typeName": "Int",
          "isRequired": true,
          "isList": false,
          "isUnique": false,
          "isId": true,
          "isReadOnly": false,
          "hasDefault": true,
          "isGenerated": false,
          "isUpdatedAt": false
        }
      ],
      "idFields": [],
      "uniqueGroups": []
    }
  ],
  "enums": []
}"#;
    assert_eq!(json, expected);
}

#[test]
fn parses_relation_fields_with_defaults() {
    let json = r#"{
  "entities": [
    {
      "name": "User",
      "fields": [
        { "name": "id", "kind": "scalar", "typeName": "Int", "isRequired": true, "isId": true },
        {
          "name": "posts",
          "kind": "relation",
          "typeName": "Post",
          "isList": true,
          "relation": { "name": "PostToUser", "relatedEntity": "Post" }
        }
      ]
    },
    {
      "name": "Post",
      "fields": [
        { "name": "id", "kind": "scalar", "typeName": "Int", "isRequired": true, "isId": true },
        { "name": "authorId", "kind": "scalar", "typeName": "Int", "isRequired": true },
        {
          "name": "author",
          "kind": "relation",
          "typeName": "User",
          "isRequired": true,
          "relation": {
            "name": "PostToUser",
            "relatedEntity": "User",
            "fields": ["authorId"],
            "references": ["id"]
          }
        }
      ]
    }
  ]
}"#;

    let model: DataModel = serde_json::from_str(json).expect("parse model");
    validate_model(&model).expect("model is consistent");

    let user = model.entity("User").expect("user entity");
    let posts = user.field("posts").and_then(|field| field.relation()).unwrap();
    assert!(!posts.is_owning());

    let post = model.entity("Post").expect("post entity");
    let author = post.field("author").and_then(|field| field.relation()).unwrap();
    assert!(author.is_owning());
    assert_eq!(
        author.key_pairs().collect::<Vec<_>>(),
        vec![("authorId", Some("id"))]
    );
    assert!(model.enums.is_empty());
}
