/// A depot with fixed coordinates. When an order's address is a
/// warehouse address the provider must not geocode it; the table
/// supplies the coordinates instead. Policy data, not logic.
pub struct Warehouse {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub const WAREHOUSES: &[Warehouse] = &[
    Warehouse {
        name: "Fresno Warehouse",
        latitude: 36.7378,
        longitude: -119.7871,
    },
    Warehouse {
        name: "Sacramento Warehouse",
        latitude: 38.5816,
        longitude: -121.4944,
    },
    Warehouse {
        name: "San Diego Warehouse",
        latitude: 32.7157,
        longitude: -117.1611,
    },
    Warehouse {
        name: "Phoenix Warehouse",
        latitude: 33.4484,
        longitude: -112.074,
    },
    Warehouse {
        name: "Tampa Warehouse",
        latitude: 27.9506,
        longitude: -82.4572,
    },
    Warehouse {
        name: "Orlando Warehouse",
        latitude: 28.5384,
        longitude: -81.3789,
    },
];

/// Look up a depot by name appearing in the address.
pub fn warehouse_for_address(address: &str) -> Option<&'static Warehouse> {
    WAREHOUSES.iter().find(|w| address.contains(w.name))
}
