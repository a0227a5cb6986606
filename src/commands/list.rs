//! List command implementation

/// List supported programmer backends
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    println!("  dummy     - In-memory flash emulator for testing");
    println!("  internal  - Intel ICH/PCH internal SPI hardware-sequencing controller (Linux, requires root)");
    println!();
    println!("Usage: rflasher <command> -p <programmer>");
    println!();
    println!("Examples:");
    println!("  rflasher probe -p internal");
    println!("  rflasher read -p internal -o flash.bin");
    println!("  rflasher jedec-id-decoded");
}
