/*!
OpenCL Device Constants

Centralized constants for device modelling to avoid magic numbers and string
literals across modules.
*/

// ========== OpenCL Status ==========
pub const CL_SUCCESS: i32 = 0;

// ========== cl_platform_info ==========
pub const CL_PLATFORM_NAME: u32 = 0x0902;
pub const CL_PLATFORM_VENDOR: u32 = 0x0903;

// ========== cl_device_info ==========
pub const CL_DEVICE_MAX_COMPUTE_UNITS: u32 = 0x1002;
pub const CL_DEVICE_MAX_CLOCK_FREQUENCY: u32 = 0x100C;
pub const CL_DEVICE_MAX_MEM_ALLOC_SIZE: u32 = 0x1010;
pub const CL_DEVICE_GLOBAL_MEM_SIZE: u32 = 0x101F;
pub const CL_DEVICE_NAME: u32 = 0x102B;
pub const CL_DEVICE_VENDOR: u32 = 0x102C;
pub const CL_DEVICE_EXTENSIONS: u32 = 0x1030;

// Vendor extensions
pub const CL_DEVICE_PCI_BUS_ID_NV: u32 = 0x4008;
pub const CL_DEVICE_PCI_SLOT_ID_NV: u32 = 0x4009;
pub const CL_DEVICE_TOPOLOGY_AMD: u32 = 0x4037;
pub const CL_DEVICE_BOARD_NAME_AMD: u32 = 0x4038;

/// `cl_device_topology_amd` is a 24 byte union; PCIe fields sit at the tail
pub const CL_DEVICE_TOPOLOGY_AMD_SIZE: usize = 24;
pub const CL_DEVICE_TOPOLOGY_TYPE_PCIE_AMD: u32 = 1;
pub const AMD_TOPOLOGY_BUS_OFFSET: usize = 21;
pub const AMD_TOPOLOGY_DEVICE_OFFSET: usize = 22;
pub const AMD_TOPOLOGY_FUNCTION_OFFSET: usize = 23;

// ========== OpenCL Library Names ==========
#[cfg(target_os = "windows")]
pub const OPENCL_LIBRARY: &str = "OpenCL.dll";
#[cfg(target_os = "macos")]
pub const OPENCL_LIBRARY: &str = "/System/Library/Frameworks/OpenCL.framework/OpenCL";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const OPENCL_LIBRARY: &str = "libOpenCL.so.1";

// ========== Vendor Keywords (lowercase) ==========
pub const VENDOR_KEYWORD_AMD_FULL: &str = "advanced micro devices";
pub const VENDOR_KEYWORD_AMD: &str = "amd";
pub const VENDOR_KEYWORD_NVIDIA: &str = "nvidia";
pub const VENDOR_KEYWORD_INTEL: &str = "intel";
pub const VENDOR_KEYWORD_APPLE: &str = "apple";

// ========== Architecture Name Fragments (lowercase) ==========
// RDNA2
pub const FRAGMENT_GFX1030: &str = "gfx1030";
pub const FRAGMENT_NAVI_21: &str = "navi 21";
pub const FRAGMENT_NAVI21: &str = "navi21";
pub const FRAGMENT_SIENNA_CICHLID: &str = "sienna cichlid";

// RDNA1
pub const FRAGMENT_GFX1012: &str = "gfx1012";
pub const FRAGMENT_NAVI_14: &str = "navi 14";
pub const FRAGMENT_NAVI14: &str = "navi14";
pub const FRAGMENT_GFX1011: &str = "gfx1011";
pub const FRAGMENT_NAVI_12: &str = "navi 12";
pub const FRAGMENT_NAVI12: &str = "navi12";
pub const FRAGMENT_GFX1010: &str = "gfx1010";
pub const FRAGMENT_NAVI_10: &str = "navi 10";
pub const FRAGMENT_NAVI10: &str = "navi10";

// GCN5
pub const FRAGMENT_GFX906: &str = "gfx906";
pub const FRAGMENT_GFX907: &str = "gfx907";
pub const FRAGMENT_VEGA_20: &str = "vega 20";
pub const FRAGMENT_VEGA20: &str = "vega20";
pub const FRAGMENT_VEGA_II: &str = "vega ii";
pub const FRAGMENT_GFX902: &str = "gfx902";
pub const FRAGMENT_GFX903: &str = "gfx903";
pub const FRAGMENT_RAVEN: &str = "raven";
// Ryzen APUs report "Radeon Vega <N> Graphics"
pub const FRAGMENT_VEGA_3_GRAPHICS: &str = "vega 3 graphics";
pub const FRAGMENT_VEGA_6_GRAPHICS: &str = "vega 6 graphics";
pub const FRAGMENT_VEGA_8_GRAPHICS: &str = "vega 8 graphics";
pub const FRAGMENT_VEGA_9_GRAPHICS: &str = "vega 9 graphics";
pub const FRAGMENT_VEGA_10_GRAPHICS: &str = "vega 10 graphics";
pub const FRAGMENT_VEGA_11_GRAPHICS: &str = "vega 11 graphics";
pub const FRAGMENT_GFX900: &str = "gfx900";
pub const FRAGMENT_GFX901: &str = "gfx901";
pub const FRAGMENT_VEGA_10: &str = "vega 10";
pub const FRAGMENT_VEGA10: &str = "vega10";
pub const FRAGMENT_VEGA: &str = "vega";

// GCN4
pub const FRAGMENT_GFX804: &str = "gfx804";
pub const FRAGMENT_LEXA: &str = "lexa";
pub const FRAGMENT_BAFFIN: &str = "baffin";
pub const FRAGMENT_ELLESMERE: &str = "ellesmere";
pub const FRAGMENT_GFX803: &str = "gfx803";
pub const FRAGMENT_POLARIS: &str = "polaris";

// ========== Construction Defaults ==========
/// Compute units assumed when the device does not report any
pub const DEFAULT_COMPUTE_UNITS: u32 = 1;

// ========== Launch Tuning Defaults ==========
pub const DEFAULT_CU_MULTIPLIER: u32 = 64;
pub const DEFAULT_WORKSIZE: u32 = 8;
pub const DEFAULT_UNROLL: u32 = 8;
pub const MAX_UNROLL: u32 = 128;
pub const MAX_WORKSIZE: u32 = 1024;

// ========== Unit Conversions ==========
pub const BYTES_PER_KB: u64 = 1024;
pub const BYTES_PER_MB: u64 = 1024 * 1024;
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;
