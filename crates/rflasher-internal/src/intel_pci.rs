//! Intel LPC/eSPI bridge PCI ID table
//!
//! A representative subset of Intel LPC/eSPI bridge device IDs, mapped to
//! the [`IchChipset`] generation they imply. Not exhaustive - flashprog's own
//! table runs into the hundreds of entries across stepping/SKU variants; this
//! table covers one device ID per generation, enough to recognize the
//! chipset family that the SPI register layout depends on.

use crate::chipset::{
    BusType, ChipsetEnable, IchChipset, TestStatus, B_LS,
};

/// Intel PCI vendor ID
pub const INTEL_VID: u16 = 0x8086;

const fn entry(
    device_id: u16,
    buses: BusType,
    status: TestStatus,
    device_name: &'static str,
    chipset: IchChipset,
) -> ChipsetEnable {
    ChipsetEnable::new(INTEL_VID, device_id, buses, status, "Intel", device_name, chipset)
}

/// Known Intel LPC/eSPI bridge (and PCH100+ dedicated SPI function) PCI IDs
pub static CHIPSET_TABLE: &[ChipsetEnable] = &[
    entry(0x2640, B_LS, TestStatus::Ok, "ICH7", IchChipset::Ich7),
    entry(0x2810, B_LS, TestStatus::Ok, "ICH8", IchChipset::Ich8),
    entry(0x2918, B_LS, TestStatus::Ok, "ICH9", IchChipset::Ich9),
    entry(0x3A18, B_LS, TestStatus::Ok, "ICH10", IchChipset::Ich10),
    entry(0x3B00, B_LS, TestStatus::Ok, "5 Series (Ibex Peak)", IchChipset::Series5IbexPeak),
    entry(0x1C40, B_LS, TestStatus::Ok, "6 Series (Cougar Point)", IchChipset::Series6CougarPoint),
    entry(0x1E40, B_LS, TestStatus::Ok, "7 Series (Panther Point)", IchChipset::Series7PantherPoint),
    entry(0x0F1C, B_LS, TestStatus::Ok, "Bay Trail", IchChipset::BayTrail),
    entry(0x8C40, B_LS, TestStatus::Ok, "8 Series (Lynx Point)", IchChipset::Series8LynxPoint),
    entry(0x9C40, B_LS, TestStatus::Ok, "8 Series LP (Lynx Point LP)", IchChipset::Series8LynxPointLp),
    entry(0x8D40, B_LS, TestStatus::Ok, "8 Series (Wellsburg)", IchChipset::Series8Wellsburg),
    entry(0x8CC0, B_LS, TestStatus::Ok, "9 Series (Wildcat Point)", IchChipset::Series9WildcatPoint),
    entry(0x9CC0, B_LS, TestStatus::Ok, "9 Series LP (Wildcat Point LP)", IchChipset::Series9WildcatPointLp),
    entry(0xA140, B_LS, TestStatus::Ok, "100 Series (Sunrise Point)", IchChipset::Series100SunrisePoint),
    entry(0xA1C1, B_LS, TestStatus::Ok, "C620 (Lewisburg)", IchChipset::C620Lewisburg),
    entry(0xA300, B_LS, TestStatus::Ok, "300 Series (Cannon Point)", IchChipset::Series300CannonPoint),
    entry(0x7A00, B_LS, TestStatus::Untested, "500 Series (Tiger Point)", IchChipset::Series500TigerPoint),
    entry(0x5AE8, B_LS, TestStatus::Ok, "Apollo Lake", IchChipset::ApolloLake),
    entry(0x31E8, B_LS, TestStatus::Ok, "Gemini Lake", IchChipset::GeminiLake),
    entry(0x4B00, B_LS, TestStatus::Untested, "Elkhart Lake", IchChipset::ElkhartLake),
    entry(0x1BCC, B_LS, TestStatus::Untested, "C740 (Emmitsburg)", IchChipset::C740Emmitsburg),
    entry(0x4DA3, B_LS, TestStatus::Untested, "Meteor Lake", IchChipset::MeteorLake),
    entry(0x7723, B_LS, TestStatus::Untested, "Lunar Lake", IchChipset::LunarLake),
    entry(0x7724, B_LS, TestStatus::Untested, "Arrow Lake", IchChipset::ArrowLake),
];

/// Look up a chipset by vendor/device ID (and, if the table entry demands
/// it, a matching revision).
pub fn find_chipset(vendor_id: u16, device_id: u16, revision_id: Option<u8>) -> Option<ChipsetEnable> {
    CHIPSET_TABLE
        .iter()
        .find(|e| {
            e.vendor_id == vendor_id
                && e.device_id == device_id
                && match (e.revision, revision_id) {
                    (Some(want), Some(got)) => want == got,
                    (Some(_), None) => false,
                    (None, _) => true,
                }
        })
        .cloned()
}
