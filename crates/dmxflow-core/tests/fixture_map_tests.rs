use dmxflow_core::{
    CoreError, FixtureDefinition, FixtureInstance, FixtureMap, Mode, OverlapPolicy, PortAddress,
    Universes,
};
use std::sync::Arc;

fn definition(channels: usize) -> Arc<FixtureDefinition> {
    let roles: Vec<String> = (1..=channels).map(|i| format!("Channel {}", i)).collect();
    let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
    Arc::new(FixtureDefinition::new(
        "Test",
        format!("{} ch", channels),
        vec![Mode::new("Default", &roles)],
    ))
}

#[test]
fn test_round_trip_offset_for_start_5_three_channels() {
    let universes = Universes::new();
    let mut map = FixtureMap::new();
    let universe = PortAddress::new(0, 0, 3).unwrap();
    let fixture = FixtureInstance::new("Wash", definition(3), "Default", universe, 5).unwrap();
    let id = map.place(fixture).unwrap();

    // Logical channel 2 (1-based) is index 1
    assert_eq!(map.resolve(id, 1).unwrap(), (universe, 5));

    map.write(&universes, id, 1, 200).unwrap();
    let buffer = universes.get(universe).unwrap();
    let snapshot = buffer.snapshot();
    assert_eq!(snapshot.channels[5], 200);
    assert_eq!(snapshot.channels.iter().filter(|&&v| v != 0).count(), 1);
}

#[test]
fn test_placement_past_universe_end_is_validation_error() {
    let err = FixtureInstance::new(
        "Edge",
        definition(3),
        "Default",
        PortAddress::default(),
        511,
    )
    .unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, CoreError::InvalidPlacement(_)));
}

#[test]
fn test_full_universe_fixture_fits() {
    let fixture =
        FixtureInstance::new("Matrix", definition(512), "Default", PortAddress::default(), 1)
            .unwrap();
    assert_eq!(fixture.end_address(), 512);
    assert_eq!(fixture.resolve(511).unwrap(), 511);
}

#[test]
fn test_channel_index_out_of_range() {
    let mut map = FixtureMap::new();
    let fixture =
        FixtureInstance::new("Par", definition(3), "Default", PortAddress::default(), 1).unwrap();
    let id = map.place(fixture).unwrap();
    let err = map.resolve(id, 3).unwrap_err();
    assert!(matches!(
        err,
        CoreError::ChannelIndexOutOfRange { index: 3, count: 3 }
    ));
}

#[test]
fn test_overlap_policy_reject() {
    let mut map = FixtureMap::with_policy(OverlapPolicy::Reject);
    let universe = PortAddress::default();
    map.place(FixtureInstance::new("A", definition(4), "Default", universe, 1).unwrap())
        .unwrap();

    let err = map
        .place(FixtureInstance::new("B", definition(4), "Default", universe, 4).unwrap())
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(map.len(), 1);

    map.set_policy(OverlapPolicy::Permissive);
    map.place(FixtureInstance::new("B", definition(4), "Default", universe, 4).unwrap())
        .unwrap();
    assert_eq!(map.len(), 2);
}
