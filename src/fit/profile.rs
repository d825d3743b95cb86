//! Static FIT profile lookup tables.
//!
//! Names, units and scale/offset transforms for the global messages and
//! fields this crate decodes, plus the manufacturer and vendor product name
//! tables used to resolve file identity. The tables are an abridged cut of
//! the published profile covering the messages common in activity files;
//! unknown numbers simply resolve to `None`.

pub const MANUFACTURER_GARMIN: u16 = 1;
pub const MANUFACTURER_DYNASTREAM_OEM: u16 = 13;
pub const MANUFACTURER_DYNASTREAM: u16 = 15;
pub const MANUFACTURER_FAVERO_ELECTRONICS: u16 = 263;

/// Seconds between the Unix epoch and the FIT device epoch
/// (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET_SECS: i64 = 631_065_600;

/// Name/units/transform metadata for one profile field.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub units: &'static str,
    pub scale: f64,
    pub offset: f64,
}

const fn info(name: &'static str, units: &'static str, scale: f64, offset: f64) -> FieldInfo {
    FieldInfo {
        name,
        units,
        scale,
        offset,
    }
}

/// Name of a global message number, or `None` when not in the profile.
pub fn mesg_name(num: u16) -> Option<&'static str> {
    Some(match num {
        0 => "file_id",
        1 => "capabilities",
        2 => "device_settings",
        3 => "user_profile",
        4 => "hrm_profile",
        5 => "sdm_profile",
        6 => "bike_profile",
        7 => "zones_target",
        8 => "hr_zone",
        9 => "power_zone",
        10 => "met_zone",
        12 => "sport",
        15 => "goal",
        18 => "session",
        19 => "lap",
        20 => "record",
        21 => "event",
        23 => "device_info",
        26 => "workout",
        27 => "workout_step",
        28 => "schedule",
        30 => "weight_scale",
        31 => "course",
        32 => "course_point",
        33 => "totals",
        34 => "activity",
        35 => "software",
        37 => "file_capabilities",
        49 => "file_creator",
        51 => "blood_pressure",
        53 => "speed_zone",
        55 => "monitoring",
        72 => "training_file",
        78 => "hrv",
        101 => "length",
        103 => "monitoring_info",
        106 => "slave_device",
        132 => "hr",
        142 => "segment_lap",
        206 => "field_description",
        207 => "developer_data_id",
        _ => return None,
    })
}

/// Profile metadata for `(mesg_num, field_num)`, or `None` when unknown.
pub fn field_info(mesg_num: u16, field_num: u8) -> Option<FieldInfo> {
    // The timestamp field is shared across every message in the profile.
    if field_num == 253 {
        return Some(info("timestamp", "s", 1.0, 0.0));
    }
    if field_num == 254 {
        return Some(info("message_index", "", 1.0, 0.0));
    }
    Some(match (mesg_num, field_num) {
        // file_id
        (0, 0) => info("type", "", 1.0, 0.0),
        (0, 1) => info("manufacturer", "", 1.0, 0.0),
        (0, 2) => info("product", "", 1.0, 0.0),
        (0, 3) => info("serial_number", "", 1.0, 0.0),
        (0, 4) => info("time_created", "", 1.0, 0.0),
        (0, 5) => info("number", "", 1.0, 0.0),
        (0, 8) => info("product_name", "", 1.0, 0.0),

        // file_creator
        (49, 0) => info("software_version", "", 1.0, 0.0),
        (49, 1) => info("hardware_version", "", 1.0, 0.0),

        // record
        (20, 0) => info("position_lat", "semicircles", 1.0, 0.0),
        (20, 1) => info("position_long", "semicircles", 1.0, 0.0),
        (20, 2) => info("altitude", "m", 5.0, 500.0),
        (20, 3) => info("heart_rate", "bpm", 1.0, 0.0),
        (20, 4) => info("cadence", "rpm", 1.0, 0.0),
        (20, 5) => info("distance", "m", 100.0, 0.0),
        (20, 6) => info("speed", "m/s", 1000.0, 0.0),
        (20, 7) => info("power", "watts", 1.0, 0.0),
        (20, 13) => info("temperature", "C", 1.0, 0.0),
        (20, 53) => info("fractional_cadence", "rpm", 128.0, 0.0),

        // session
        (18, 0) => info("event", "", 1.0, 0.0),
        (18, 1) => info("event_type", "", 1.0, 0.0),
        (18, 2) => info("start_time", "", 1.0, 0.0),
        (18, 5) => info("sport", "", 1.0, 0.0),
        (18, 6) => info("sub_sport", "", 1.0, 0.0),
        (18, 7) => info("total_elapsed_time", "s", 1000.0, 0.0),
        (18, 8) => info("total_timer_time", "s", 1000.0, 0.0),
        (18, 9) => info("total_distance", "m", 100.0, 0.0),
        (18, 11) => info("total_calories", "kcal", 1.0, 0.0),
        (18, 14) => info("avg_speed", "m/s", 1000.0, 0.0),
        (18, 15) => info("max_speed", "m/s", 1000.0, 0.0),
        (18, 16) => info("avg_heart_rate", "bpm", 1.0, 0.0),
        (18, 17) => info("max_heart_rate", "bpm", 1.0, 0.0),

        // lap
        (19, 0) => info("event", "", 1.0, 0.0),
        (19, 1) => info("event_type", "", 1.0, 0.0),
        (19, 2) => info("start_time", "", 1.0, 0.0),
        (19, 7) => info("total_elapsed_time", "s", 1000.0, 0.0),
        (19, 8) => info("total_timer_time", "s", 1000.0, 0.0),
        (19, 9) => info("total_distance", "m", 100.0, 0.0),

        // event
        (21, 0) => info("event", "", 1.0, 0.0),
        (21, 1) => info("event_type", "", 1.0, 0.0),
        (21, 3) => info("data", "", 1.0, 0.0),
        (21, 4) => info("event_group", "", 1.0, 0.0),

        // device_info
        (23, 0) => info("device_index", "", 1.0, 0.0),
        (23, 1) => info("device_type", "", 1.0, 0.0),
        (23, 2) => info("manufacturer", "", 1.0, 0.0),
        (23, 3) => info("serial_number", "", 1.0, 0.0),
        (23, 4) => info("product", "", 1.0, 0.0),
        (23, 5) => info("software_version", "", 100.0, 0.0),
        (23, 10) => info("battery_voltage", "V", 256.0, 0.0),
        (23, 27) => info("product_name", "", 1.0, 0.0),

        // activity
        (34, 0) => info("total_timer_time", "s", 1000.0, 0.0),
        (34, 1) => info("num_sessions", "", 1.0, 0.0),
        (34, 2) => info("type", "", 1.0, 0.0),
        (34, 3) => info("event", "", 1.0, 0.0),
        (34, 4) => info("event_type", "", 1.0, 0.0),
        (34, 5) => info("local_timestamp", "", 1.0, 0.0),

        // hrv
        (78, 0) => info("time", "s", 1000.0, 0.0),

        // field_description
        (206, 0) => info("developer_data_index", "", 1.0, 0.0),
        (206, 1) => info("field_definition_number", "", 1.0, 0.0),
        (206, 2) => info("fit_base_type_id", "", 1.0, 0.0),
        (206, 3) => info("field_name", "", 1.0, 0.0),
        (206, 8) => info("units", "", 1.0, 0.0),
        (206, 14) => info("native_mesg_num", "", 1.0, 0.0),
        (206, 15) => info("native_field_num", "", 1.0, 0.0),

        // developer_data_id
        (207, 1) => info("application_id", "", 1.0, 0.0),
        (207, 3) => info("developer_data_index", "", 1.0, 0.0),
        (207, 4) => info("application_version", "", 1.0, 0.0),

        _ => return None,
    })
}

/// Manufacturer name for an index, or `None` when unknown. Abridged table.
pub fn manufacturer_name(index: u16) -> Option<&'static str> {
    Some(match index {
        1 => "GARMIN",
        2 => "GARMIN_FR405_ANTFS",
        3 => "ZEPHYR",
        4 => "DAYTON",
        5 => "IDT",
        6 => "SRM",
        7 => "QUARQ",
        8 => "IBIKE",
        9 => "SARIS",
        10 => "SPARK_HK",
        11 => "TANITA",
        12 => "ECHOWELL",
        13 => "DYNASTREAM_OEM",
        14 => "NAUTILUS",
        15 => "DYNASTREAM",
        16 => "TIMEX",
        17 => "METRIGEAR",
        18 => "XELIC",
        19 => "BEURER",
        20 => "CARDIOSPORT",
        21 => "A_AND_D",
        22 => "HMM",
        23 => "SUUNTO",
        24 => "THITA_ELEKTRONIK",
        25 => "GPULSE",
        26 => "CLEAN_MOBILE",
        27 => "PEDAL_BRAIN",
        28 => "PEAKSWARE",
        29 => "SAXONAR",
        30 => "LEMOND_FITNESS",
        31 => "DEXCOM",
        32 => "WAHOO_FITNESS",
        33 => "OCTANE_FITNESS",
        38 => "OSYNCE",
        40 => "CONCEPT2",
        48 => "PIONEER",
        51 => "4IIIIS",
        63 => "SPECIALIZED",
        67 => "BKOOL",
        68 => "CATEYE",
        69 => "STAGES_CYCLING",
        70 => "SIGMASPORT",
        71 => "TOMTOM",
        73 => "WATTBIKE",
        76 => "MOXY",
        83 => "SCOSCHE",
        86 => "ELITE",
        89 => "TACX",
        95 => "STRYD",
        96 => "ICG",
        98 => "BSX_ATHLETICS",
        107 => "MAGENE",
        118 => "IGPSPORT",
        123 => "POLAR_ELECTRO",
        132 => "COROS_BYTE",
        255 => "DEVELOPMENT",
        257 => "HEALTHANDLIFE",
        258 => "LEZYNE",
        259 => "SCRIBE_LABS",
        260 => "ZWIFT",
        261 => "WATTEAM",
        262 => "RECON",
        263 => "FAVERO_ELECTRONICS",
        264 => "DYNOVELO",
        265 => "STRAVA",
        266 => "PRECOR",
        267 => "BRYTON",
        268 => "SRAM",
        281 => "TRAINER_ROAD",
        282 => "THE_SUFFERFEST",
        289 => "HAMMERHEAD",
        294 => "COROS",
        305 => "WHOOP",
        _ => return None,
    })
}

/// Garmin product name for an index, or `None` when unknown. Abridged table.
pub fn garmin_product_name(index: u16) -> Option<&'static str> {
    Some(match index {
        1 => "HRM1",
        2 => "AXH01",
        3 => "AXB01",
        4 => "AXB02",
        5 => "HRM2SS",
        6 => "DSI_ALF02",
        7 => "HRM3SS",
        8 => "HRM_RUN_SINGLE_BYTE_PRODUCT_ID",
        9 => "BSM",
        10 => "BCM",
        11 => "AXS01",
        717 => "FR405",
        782 => "FR50",
        988 => "FR60",
        1018 => "FR310XT",
        1036 => "EDGE500",
        1124 => "FR110",
        1169 => "EDGE800",
        1253 => "CHIRP",
        1325 => "EDGE200",
        1328 => "FR910XT",
        1345 => "FR610",
        1482 => "FR10",
        1499 => "SWIM",
        1551 => "FENIX",
        1561 => "EDGE510",
        1567 => "EDGE810",
        1570 => "TEMPE",
        1623 => "FR620",
        1632 => "FR220",
        1765 => "FR920XT",
        1836 => "EDGE1000",
        1837 => "VIVO_FIT",
        1903 => "FR15",
        1907 => "VIVO_ACTIVE",
        1967 => "FENIX2",
        1988 => "EPIX",
        2050 => "FENIX3",
        2067 => "EDGE520",
        2147 => "EDGE25",
        2153 => "FR225",
        2156 => "FR630",
        2157 => "FR230",
        2158 => "FR735XT",
        2204 => "EDGE_EXPLORE_1000",
        2431 => "FR235",
        2530 => "EDGE820",
        2604 => "FENIX5S",
        2691 => "FR935",
        2697 => "FENIX5",
        2713 => "EDGE1030",
        2886 => "FR645",
        3110 => "VIVO_ACTIVE3M",
        3121 => "EDGE530",
        3122 => "EDGE830",
        3288 => "FR245",
        3289 => "FR245M",
        3441 => "FR945",
        _ => return None,
    })
}

/// Favero product name for an index, or `None` when unknown.
pub fn favero_product_name(index: u16) -> Option<&'static str> {
    Some(match index {
        10 => "ASSIOMA_UNO",
        12 => "ASSIOMA_DUO",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_timestamp_field() {
        let ts = field_info(20, 253).unwrap();
        assert_eq!(ts.name, "timestamp");
        assert_eq!(ts.units, "s");
        let ts = field_info(9999, 253).unwrap();
        assert_eq!(ts.name, "timestamp");
    }

    #[test]
    fn test_unknown_numbers_resolve_to_none() {
        assert!(mesg_name(4242).is_none());
        assert!(field_info(20, 200).is_none());
        assert!(manufacturer_name(9999).is_none());
        assert!(garmin_product_name(0xFFFE).is_none());
    }

    #[test]
    fn test_scaled_record_fields() {
        let altitude = field_info(20, 2).unwrap();
        assert_eq!(altitude.scale, 5.0);
        assert_eq!(altitude.offset, 500.0);
        let speed = field_info(20, 6).unwrap();
        assert_eq!(speed.scale, 1000.0);
    }
}
