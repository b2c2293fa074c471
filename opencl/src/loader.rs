//! Runtime-loaded OpenCL ICD
//!
//! Answers native device queries through `clGetDeviceInfo` and
//! `clGetPlatformInfo` resolved from the system OpenCL library.

use libloading::{Library, Symbol};
use std::ffi::{c_void, OsStr};
use std::ptr;

use crate::constants::*;
use crate::native::{nvidia_topology, DeviceId, DeviceInfoSource, DeviceParam, PlatformId, PlatformParam};
use crate::topology::PciTopology;
use crate::vendor::OclVendor;
use crate::{OclError, Result};

type ClGetDeviceInfo = unsafe extern "C" fn(
    device: *mut c_void,
    param_name: u32,
    param_value_size: usize,
    param_value: *mut c_void,
    param_value_size_ret: *mut usize,
) -> i32;

type ClGetPlatformInfo = unsafe extern "C" fn(
    platform: *mut c_void,
    param_name: u32,
    param_value_size: usize,
    param_value: *mut c_void,
    param_value_size_ret: *mut usize,
) -> i32;

/// Loaded OpenCL library
pub struct OpenClLibrary {
    get_device_info: ClGetDeviceInfo,
    get_platform_info: ClGetPlatformInfo,
    // Keeps the function pointers above valid
    _library: Library,
}

impl std::fmt::Debug for OpenClLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenClLibrary").finish_non_exhaustive()
    }
}

impl OpenClLibrary {
    /// Load the platform's default OpenCL library
    pub fn load() -> Result<Self> {
        Self::load_from(OPENCL_LIBRARY)
    }

    /// Load an OpenCL library from a specific path
    pub fn load_from<P: AsRef<OsStr>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // SAFETY: loading a shared library runs its initializers. The OpenCL
        // ICD loader has no initialization side effects beyond its own state.
        let library = unsafe {
            Library::new(path).map_err(|e| {
                OclError::LibraryLoad(format!("{}: {}", path.to_string_lossy(), e))
            })?
        };

        // SAFETY: the symbol types match the OpenCL 1.2 C API, and the
        // library is stored alongside the copied function pointers.
        let (get_device_info, get_platform_info) = unsafe {
            let device_info: Symbol<ClGetDeviceInfo> = library
                .get(b"clGetDeviceInfo\0")
                .map_err(|e| OclError::MissingSymbol(format!("clGetDeviceInfo: {}", e)))?;
            let platform_info: Symbol<ClGetPlatformInfo> = library
                .get(b"clGetPlatformInfo\0")
                .map_err(|e| OclError::MissingSymbol(format!("clGetPlatformInfo: {}", e)))?;
            (*device_info, *platform_info)
        };

        log::info!("Loaded OpenCL library {}", path.to_string_lossy());

        Ok(Self {
            get_device_info,
            get_platform_info,
            _library: library,
        })
    }

    fn device_info_raw(&self, device: DeviceId, code: u32) -> Result<Vec<u8>> {
        let mut size = 0usize;

        // SAFETY: size query with a null buffer; `device` is non-null.
        let status = unsafe { (self.get_device_info)(device.as_raw(), code, 0, ptr::null_mut(), &mut size) };
        check(status, "clGetDeviceInfo", code)?;

        let mut buffer = vec![0u8; size];
        if size == 0 {
            return Ok(buffer);
        }

        // SAFETY: the buffer holds exactly the number of bytes the driver asked for.
        let status = unsafe {
            (self.get_device_info)(
                device.as_raw(),
                code,
                size,
                buffer.as_mut_ptr() as *mut c_void,
                ptr::null_mut(),
            )
        };
        check(status, "clGetDeviceInfo", code)?;

        Ok(buffer)
    }

    fn platform_info_raw(&self, platform: PlatformId, code: u32) -> Result<Vec<u8>> {
        let mut size = 0usize;

        // SAFETY: size query with a null buffer; `platform` is non-null.
        let status =
            unsafe { (self.get_platform_info)(platform.as_raw(), code, 0, ptr::null_mut(), &mut size) };
        check(status, "clGetPlatformInfo", code)?;

        let mut buffer = vec![0u8; size];
        if size == 0 {
            return Ok(buffer);
        }

        // SAFETY: the buffer holds exactly the number of bytes the driver asked for.
        let status = unsafe {
            (self.get_platform_info)(
                platform.as_raw(),
                code,
                size,
                buffer.as_mut_ptr() as *mut c_void,
                ptr::null_mut(),
            )
        };
        check(status, "clGetPlatformInfo", code)?;

        Ok(buffer)
    }
}

fn check(status: i32, call: &str, code: u32) -> Result<()> {
    if status == CL_SUCCESS {
        Ok(())
    } else {
        Err(OclError::NativeQuery(format!(
            "{}(0x{:04x}) returned {}",
            call, code, status
        )))
    }
}

fn decode_string(raw: Vec<u8>) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

fn decode_u32(raw: &[u8]) -> Result<u32> {
    raw.get(..4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_ne_bytes)
        .ok_or_else(|| OclError::NativeQuery(format!("expected 4 bytes, got {}", raw.len())))
}

fn decode_u64(raw: &[u8]) -> Result<u64> {
    raw.get(..8)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u64::from_ne_bytes)
        .ok_or_else(|| OclError::NativeQuery(format!("expected 8 bytes, got {}", raw.len())))
}

impl DeviceInfoSource for OpenClLibrary {
    fn device_string(&self, device: DeviceId, param: DeviceParam) -> Result<String> {
        self.device_info_raw(device, param.code()).map(decode_string)
    }

    fn device_u32(&self, device: DeviceId, param: DeviceParam) -> Result<u32> {
        decode_u32(&self.device_info_raw(device, param.code())?)
    }

    fn device_u64(&self, device: DeviceId, param: DeviceParam) -> Result<u64> {
        decode_u64(&self.device_info_raw(device, param.code())?)
    }

    fn platform_string(&self, platform: PlatformId, param: PlatformParam) -> Result<String> {
        self.platform_info_raw(platform, param.code()).map(decode_string)
    }

    fn topology(&self, device: DeviceId, vendor: OclVendor) -> Result<PciTopology> {
        match vendor {
            OclVendor::Amd => {
                let raw = self.device_info_raw(device, DeviceParam::TopologyAmd.code())?;
                PciTopology::from_amd_raw(&raw)
                    .ok_or_else(|| OclError::NativeQuery("unsupported AMD topology type".to_string()))
            }
            OclVendor::Nvidia => nvidia_topology(self, device),
            _ => Err(OclError::NativeQuery(format!(
                "no topology extension for {} devices",
                vendor
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_reported() {
        let err = OpenClLibrary::load_from("/nonexistent/libOpenCL-missing.so").unwrap_err();
        assert!(matches!(err, OclError::LibraryLoad(_)));
        assert!(!err.is_device_exclusion());
    }

    #[test]
    fn test_decode_string_stops_at_nul() {
        assert_eq!(decode_string(b"gfx906\0\0".to_vec()), "gfx906");
        assert_eq!(decode_string(b" Ellesmere ".to_vec()), "Ellesmere");
        assert_eq!(decode_string(Vec::new()), "");
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode_u32(&64u32.to_ne_bytes()).unwrap(), 64);
        assert_eq!(decode_u64(&(8u64 << 30).to_ne_bytes()).unwrap(), 8 << 30);
        assert!(decode_u64(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_check_status() {
        assert!(check(CL_SUCCESS, "clGetDeviceInfo", CL_DEVICE_NAME).is_ok());
        assert!(check(-30, "clGetDeviceInfo", CL_DEVICE_NAME).is_err());
    }
}
