use clap::ValueEnum;
use sharkport_proc_macros::{CustomValueEnum, EnumAll, EnumDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumAll, EnumDisplay, CustomValueEnum)]
enum MemoryKind {
    Sram,
    #[enum_display(name = "Flash (128KB)")]
    Flash128K,
    None,
}

#[test]
fn all_variants_in_order() {
    assert_eq!(MemoryKind::ALL, [MemoryKind::Sram, MemoryKind::Flash128K, MemoryKind::None]);
}

#[test]
fn display_uses_name_override() {
    assert_eq!(MemoryKind::Sram.to_string(), "Sram");
    assert_eq!(MemoryKind::Flash128K.to_string(), "Flash (128KB)");
    assert_eq!(MemoryKind::None.to_str(), "None");
}

#[test]
fn value_enum_uses_lowercase_names() {
    let values: Vec<_> = MemoryKind::value_variants()
        .iter()
        .filter_map(|kind| kind.to_possible_value())
        .map(|value| value.get_name().to_owned())
        .collect();
    assert_eq!(values, ["sram", "flash128k", "none"]);

    assert_eq!(MemoryKind::from_str("flash128k", false), Ok(MemoryKind::Flash128K));
    assert_eq!(MemoryKind::from_str("FLASH128K", true), Ok(MemoryKind::Flash128K));
    assert!(MemoryKind::from_str("flash", false).is_err());
}
