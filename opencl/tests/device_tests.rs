/// OpenCL device model and launch planning tests
///
/// Drives the public API the way an enumeration layer does:
/// - builds device models from pre-queried capability numbers
/// - checks architecture classification and memory ceilings
/// - plans workloads across several devices, including skipped ones

use tabagent_opencl::{
    classify,
    constants::*,
    plan_devices,
    DeviceId,
    DeviceRecord,
    OclArchitecture,
    OclConfig,
    OclDevice,
    OclError,
    OclVendor,
    PciTopology,
    PlatformId,
    StaticDeviceInfo,
    ThreadConfig,
    Workload,
};

fn platform() -> PlatformId {
    PlatformId::new(0xa0).unwrap()
}

fn device_id(index: u32) -> DeviceId {
    DeviceId::new(0x1000 + index as usize).unwrap()
}

fn build(index: u32, record: DeviceRecord) -> OclDevice {
    let source = StaticDeviceInfo::new()
        .with_platform(platform(), "Advanced Micro Devices, Inc.")
        .with_device(device_id(index), record);
    OclDevice::new(index, Some(device_id(index)), Some(platform()), &source)
}

fn vega_20_xtx(index: u32) -> OclDevice {
    build(
        index,
        DeviceRecord::new("Vega 20 XTX")
            .with_vendor("Advanced Micro Devices, Inc.")
            .with_compute_units(60)
            .with_global_mem_size(8 * BYTES_PER_GB)
            .with_max_mem_alloc_size(2 * BYTES_PER_GB),
    )
}

// ========== DEVICE MODEL TESTS ==========

#[test]
fn test_vega_20_scenario() {
    println!("\n🧪 Testing Vega 20 XTX device model...");

    let device = vega_20_xtx(0);

    assert!(device.is_valid());
    assert_eq!(device.architecture(), OclArchitecture::Vega20);
    assert_eq!(device.compute_units(), 60);
    assert_eq!(device.free_mem_size(), 2 * BYTES_PER_GB);
    assert_eq!(device.free_mem_size(), device.free_mem_size());

    println!("✅ {} -> {}", device.printable_name(), device.architecture());
}

#[test]
fn test_memory_ceiling_takes_tighter_limit() {
    println!("\n🧪 Testing memory ceiling...");

    let alloc_bound = build(
        0,
        DeviceRecord::new("gfx900")
            .with_global_mem_size(8 * BYTES_PER_GB)
            .with_max_mem_alloc_size(2 * BYTES_PER_GB),
    );
    assert_eq!(alloc_bound.free_mem_size(), 2 * BYTES_PER_GB);

    // Some drivers report an allocation limit above global memory
    let global_bound = build(
        1,
        DeviceRecord::new("gfx900")
            .with_global_mem_size(3 * BYTES_PER_GB)
            .with_max_mem_alloc_size(4 * BYTES_PER_GB),
    );
    assert_eq!(global_bound.free_mem_size(), 3 * BYTES_PER_GB);

    println!("✅ Memory ceiling is min(max alloc, global)");
}

#[test]
fn test_unreported_compute_units_default_to_one() {
    let zero = build(0, DeviceRecord::new("Ellesmere").with_compute_units(0));
    assert_eq!(zero.compute_units(), 1);

    let missing = build(1, DeviceRecord::new("Ellesmere"));
    assert_eq!(missing.compute_units(), 1);
}

#[test]
fn test_invalid_device_is_constructed_not_failed() {
    let source = StaticDeviceInfo::new();

    let device = OclDevice::new(5, None, None, &source);
    assert!(!device.is_valid());
    assert_eq!(device.index(), 5);
    assert!(device.compute_units() >= 1);

    let err = device.generate(&Workload::new("cn/r", 1), None).unwrap_err();
    assert!(matches!(err, OclError::InvalidDevice { index: 5 }));
    assert!(err.is_device_exclusion());
}

#[test]
fn test_amd_board_and_topology() {
    let device = build(
        0,
        DeviceRecord::new("gfx1030")
            .with_vendor("Advanced Micro Devices, Inc.")
            .with_board("AMD Radeon RX 6800 XT")
            .with_topology(PciTopology::new(0x0c, 0, 0)),
    );

    assert_eq!(device.vendor_id(), OclVendor::Amd);
    assert_eq!(device.architecture(), OclArchitecture::Navi21);
    assert_eq!(device.board(), "AMD Radeon RX 6800 XT");
    assert_eq!(device.printable_name(), "AMD Radeon RX 6800 XT (gfx1030)");
    assert_eq!(device.topology().to_string(), "0c:00.0");
}

// ========== CLASSIFICATION TESTS ==========

#[test]
fn test_unrecognized_name_still_generates() {
    println!("\n🧪 Testing unknown architecture fallback...");

    let device = build(
        0,
        DeviceRecord::new("Experimental ASIC v9")
            .with_compute_units(8)
            .with_global_mem_size(BYTES_PER_GB)
            .with_max_mem_alloc_size(BYTES_PER_GB),
    );
    assert_eq!(device.architecture(), OclArchitecture::Unknown);

    let threads = device.generate(&Workload::new("cn/r", 2 * BYTES_PER_MB), None).unwrap();
    let thread = threads.get(0).unwrap();
    assert_eq!(thread.worksize, DEFAULT_WORKSIZE);
    assert_eq!(thread.unroll, DEFAULT_UNROLL);
    assert_eq!(thread.intensity, 8 * DEFAULT_CU_MULTIPLIER);

    println!("✅ Unknown architecture uses default tuning");
}

#[test]
fn test_classification_is_case_insensitive() {
    assert_eq!(classify("ELLESMERE"), OclArchitecture::Ellesmere);
    assert_eq!(classify("ellesmere"), OclArchitecture::Ellesmere);
    assert_eq!(classify("Radeon RX VEGA 20"), OclArchitecture::Vega20);
}

// ========== GENERATION TESTS ==========

#[test]
fn test_footprint_above_ceiling_is_incompatible() {
    println!("\n🧪 Testing incompatible device...");

    let device = vega_20_xtx(0);
    let workload = Workload::new("rx/wow", 2 * BYTES_PER_GB + 1);

    let err = device.generate(&workload, None).unwrap_err();
    match err {
        OclError::IncompatibleDevice { index, available, required } => {
            assert_eq!(index, 0);
            assert_eq!(available, 2 * BYTES_PER_GB);
            assert_eq!(required, 2 * BYTES_PER_GB + 1);
        }
        other => panic!("unexpected error: {}", other),
    }

    println!("✅ Device excluded with zero configurations");
}

#[test]
fn test_explicit_config_still_hits_memory_check() {
    let device = vega_20_xtx(0);
    let explicit = ThreadConfig::new(0).with_intensity(1).with_worksize(1);

    let err = device
        .generate(&Workload::new("rx/wow", 2 * BYTES_PER_GB + 1), Some(&explicit))
        .unwrap_err();
    assert!(matches!(err, OclError::IncompatibleDevice { .. }));

    let threads = device
        .generate(&Workload::new("cn/r", 2 * BYTES_PER_MB), Some(&explicit))
        .unwrap();
    assert_eq!(threads.get(0).unwrap().intensity, 1);
    assert_eq!(threads.get(0).unwrap().worksize, 1);
}

// ========== PLANNING TESTS ==========

#[test]
fn test_plan_skips_only_failing_devices() {
    println!("\n🧪 Testing multi-device planning...");

    let small = build(
        1,
        DeviceRecord::new("gfx804")
            .with_compute_units(8)
            .with_global_mem_size(2 * BYTES_PER_GB)
            .with_max_mem_alloc_size(512 * BYTES_PER_MB),
    );
    let invalid = OclDevice::new(2, None, Some(platform()), &StaticDeviceInfo::new());
    let devices = vec![vega_20_xtx(3), small, invalid, vega_20_xtx(0)];

    let workload = Workload::new("rx/0", BYTES_PER_GB);
    let plan = plan_devices(&devices, &workload, &OclConfig::default());

    let planned: Vec<u32> = plan.planned.iter().map(|p| p.index).collect();
    let skipped: Vec<u32> = plan.skipped.iter().map(|s| s.index).collect();
    assert_eq!(planned, vec![0, 3]);
    assert_eq!(skipped, vec![1, 2]);
    assert!(plan.skipped.iter().all(|s| s.error.is_device_exclusion()));
    assert_eq!(plan.skipped[0].error.device_index(), Some(1));

    let order: Vec<(u32, u32)> = plan.threads().map(|t| (t.index, t.partition)).collect();
    assert_eq!(order, vec![(0, 0), (3, 0)]);

    println!("✅ Planned {:?}, skipped {:?}", planned, skipped);
}

#[test]
fn test_plan_uses_explicit_threads_per_device() {
    let mut config = OclConfig::default();
    config.set_threads("cn/r", vec![ThreadConfig::new(1).with_intensity(320).with_worksize(4)]);

    let devices = vec![vega_20_xtx(0), vega_20_xtx(1)];
    let plan = plan_devices(&devices, &Workload::new("cn/r", 2 * BYTES_PER_MB), &config);

    assert_eq!(plan.planned.len(), 2);
    let first = plan.planned[0].threads.get(0).unwrap();
    let second = plan.planned[1].threads.get(0).unwrap();
    assert_eq!(first.worksize, 16);
    assert_eq!(second.intensity, 320);
    assert_eq!(second.worksize, 4);
}

#[test]
fn test_disabled_backend_plans_nothing() {
    let config = OclConfig {
        enabled: false,
        ..OclConfig::default()
    };

    let plan = plan_devices(&[vega_20_xtx(0)], &Workload::new("cn/r", 1), &config);
    assert!(plan.is_empty());
    assert!(plan.skipped.is_empty());
}

#[test]
fn test_concurrent_generation() {
    let devices: Vec<OclDevice> = (0..4).map(vega_20_xtx).collect();
    let workload = Workload::new("cn/r", 2 * BYTES_PER_MB).with_partitions(2);
    let workload = &workload;

    std::thread::scope(|scope| {
        let handles: Vec<_> = devices
            .iter()
            .map(|device| scope.spawn(move || device.generate(workload, None)))
            .collect();

        for handle in handles {
            let threads = handle.join().unwrap().unwrap();
            assert_eq!(threads.len(), 2);
        }
    });
}
