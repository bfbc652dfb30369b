use crate::resource::map::{Resource, ResourceMap, ResourceType};

#[test]
fn resource_map_written_and_read() -> Result<(), anyhow::Error> {
    let map = ResourceMap {
        resource_type: ResourceType::Sounds,
        resources: vec![
            Resource {
                name: "sound\\sfx\\ui\\cursor__permutations".into(),
                data: vec![1, 2, 3, 4],
            },
            Resource {
                name: "sound\\sfx\\ui\\back__permutations".into(),
                data: vec![5; 33],
            },
        ],
    };

    let parsed = ResourceMap::parse(&map.to_bytes()?)?;
    assert_eq!(parsed, map);
    assert_eq!(parsed.find_by_data(&[5; 33]), Some(1));
    assert_eq!(parsed.find_by_data(&[5; 32]), None);
    Ok(())
}

#[test]
fn truncated_resource_map() -> Result<(), anyhow::Error> {
    let map = ResourceMap {
        resource_type: ResourceType::Bitmaps,
        resources: vec![Resource {
            name: "a".into(),
            data: vec![0; 64],
        }],
    };
    let bytes = map.to_bytes()?;
    assert!(ResourceMap::parse(&bytes[..40]).is_err());
    assert!(ResourceMap::parse(&[]).is_err());
    Ok(())
}
