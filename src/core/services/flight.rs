use crate::core::connector::Connector;
use crate::core::request::Request;
use crate::core::route::{QueryParams, Route};
use crate::domain::model::{
    BoolResponseModel, EnumerableResponseModel, Envelope, FlightFilter, ScheduledFlight,
};
use crate::domain::ports::HttpMethod;
use crate::utils::error::{Result, ServiceError};

/// 航班搜尋服務
#[derive(Debug, Clone)]
pub struct FlightConnector {
    connector: Connector,
}

impl FlightConnector {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub fn get_scheduled_flight(&self, id: i64) -> GetScheduledFlight {
        GetScheduledFlight {
            connector: self.connector.clone(),
            id,
        }
    }

    pub fn search_flights(&self, filter: FlightFilter) -> SearchFlights {
        SearchFlights {
            connector: self.connector.clone(),
            filter,
        }
    }

    pub fn flight_exists(&self, id: i64) -> FlightExists {
        FlightExists {
            connector: self.connector.clone(),
            id,
        }
    }

    /// 查詢航班，找不到時轉成 `FlightDoesNotExist`（前端訂票流程用）
    pub async fn require_flight(&self, id: i64) -> Result<ScheduledFlight> {
        match self.get_scheduled_flight(id).send().await {
            Err(ServiceError::NotFound { .. }) => Err(ServiceError::FlightDoesNotExist { id }),
            other => other,
        }
    }
}

pub struct GetScheduledFlight {
    connector: Connector,
    id: i64,
}

impl Request for GetScheduledFlight {
    type Response = ScheduledFlight;
    type Output = ScheduledFlight;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn route(&self) -> Route {
        Route::new(["api".to_string(), "flights".to_string(), self.id.to_string()])
    }

    fn into_output(response: ScheduledFlight) -> ScheduledFlight {
        response
    }
}

pub struct SearchFlights {
    connector: Connector,
    filter: FlightFilter,
}

impl Request for SearchFlights {
    type Response = EnumerableResponseModel<ScheduledFlight>;
    type Output = Vec<ScheduledFlight>;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn route(&self) -> Route {
        Route::new(["api", "flights"])
    }

    fn query(&self) -> QueryParams {
        QueryParams::new()
            .with_optional("departureCity", self.filter.departure_city.as_deref())
            .with_optional("arrivalCity", self.filter.arrival_city.as_deref())
            .with_optional(
                "departureDate",
                self.filter
                    .departure_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            )
            .with_optional("minAvailableSeats", self.filter.min_available_seats)
    }

    fn into_output(response: EnumerableResponseModel<ScheduledFlight>) -> Vec<ScheduledFlight> {
        response.into_result()
    }
}

pub struct FlightExists {
    connector: Connector,
    id: i64,
}

impl Request for FlightExists {
    type Response = BoolResponseModel;
    type Output = bool;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn route(&self) -> Route {
        Route::new([
            "api".to_string(),
            "flights".to_string(),
            self.id.to_string(),
            "exists".to_string(),
        ])
    }

    fn into_output(response: BoolResponseModel) -> bool {
        response.into_result()
    }
}
