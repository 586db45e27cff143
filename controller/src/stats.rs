/// ----- STATISTICS MODULE -----
/// Snapshot schema returned to any reporting layer. Field names are part of
/// the contract, hence the camelCase rename on every struct.

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorStatistics {
    pub total_passengers: u32,
    pub total_traveled_floors: u32,
    pub current_passengers: u8,
    pub idle_time_seconds: u64,
    pub target_floors_count: usize,
    pub is_idle: bool,
    pub efficiency: f64,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorReport {
    pub id: u8,
    pub name: String,
    pub status: String,
    pub current_floor: u8,
    pub passengers: u8,
    pub statistics: ElevatorStatistics,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatistics {
    pub total_requests: u32,
    pub processed_requests: u32,
    pub rejected_requests: u32,
    pub pending_requests: usize,
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_processing_time_ms: Option<f64>,
    pub elevators: Vec<ElevatorReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SystemStatistics {
        SystemStatistics {
            total_requests: 3,
            processed_requests: 2,
            rejected_requests: 1,
            pending_requests: 0,
            strategy: String::from("COLLECTIVE"),
            average_processing_time_ms: None,
            elevators: vec![ElevatorReport {
                id: 1,
                name: String::from("Lift-1"),
                status: String::from("STOPPED"),
                current_floor: 4,
                passengers: 2,
                statistics: ElevatorStatistics {
                    total_passengers: 5,
                    total_traveled_floors: 10,
                    current_passengers: 2,
                    idle_time_seconds: 7,
                    target_floors_count: 0,
                    is_idle: false,
                    efficiency: 2.0,
                },
            }],
        }
    }

    #[test]
    fn schema_uses_camel_case_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let top = value.as_object().unwrap();
        for key in [
            "totalRequests",
            "processedRequests",
            "rejectedRequests",
            "pendingRequests",
            "strategy",
            "elevators",
        ] {
            assert!(top.contains_key(key), "missing key {key}");
        }
        let elevator = value["elevators"][0].as_object().unwrap();
        for key in ["id", "name", "status", "currentFloor", "passengers", "statistics"] {
            assert!(elevator.contains_key(key), "missing key {key}");
        }
        let statistics = value["elevators"][0]["statistics"].as_object().unwrap();
        for key in [
            "totalPassengers",
            "totalTraveledFloors",
            "currentPassengers",
            "idleTimeSeconds",
            "targetFloorsCount",
            "isIdle",
            "efficiency",
        ] {
            assert!(statistics.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn average_is_omitted_until_measured() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(!value.as_object().unwrap().contains_key("averageProcessingTimeMs"));

        let mut with_average = sample();
        with_average.average_processing_time_ms = Some(1.5);
        let value = serde_json::to_value(with_average).unwrap();
        assert_eq!(value["averageProcessingTimeMs"], 1.5);
    }
}
