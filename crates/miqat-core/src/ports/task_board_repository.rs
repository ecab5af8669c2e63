use crate::domain::TaskBoard;

use super::StoreError;

pub trait TaskBoardRepository: Send + Sync {
    fn load_board(&self) -> Result<TaskBoard, StoreError>;

    fn save_board(&self, board: &TaskBoard) -> Result<(), StoreError>;
}
